//! A parsed Markdown source file.

use crate::frontmatter::split_front_matter;
use crate::markdown::MarkdownProcessor;
use crate::metadata::{DatePolicy, DocumentMetadata, MetadataError};
use crate::slug::{normalize_slug, slugify};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("Missing title: set `title` in the front matter or start the body with a `# Heading`")]
    MissingTitle,

    #[error("Invalid slug: {0:?} has no URL-safe characters")]
    InvalidSlug(String),
}

/// How post file names are laid out under `posts/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostLayout {
    /// `{YYYY}-{MM}-{slug}.html`
    #[default]
    Dated,
    /// `{slug}.html`
    Flat,
}

/// A post or page, fully parsed and rendered to HTML
#[derive(Debug, Clone)]
pub struct Document {
    source_path: Option<PathBuf>,
    title: String,
    date: DateTime<Utc>,
    slug: String,
    content_html: String,
}

impl Document {
    /// Read and parse the Markdown file at `path`, requiring a `date`.
    pub fn parse(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        Self::parse_with(path, DatePolicy::Strict)
    }

    pub fn parse_with(path: impl AsRef<Path>, policy: DatePolicy) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut document = Self::from_source(&source, policy)?;
        document.source_path = Some(path.to_path_buf());
        Ok(document)
    }

    /// Parse a document from its raw text.
    ///
    /// Metadata is validated first, then the title, then the slug; the first
    /// failure is returned.
    pub fn from_source(source: &str, policy: DatePolicy) -> Result<Self, DocumentError> {
        let (metadata_text, body) = split_front_matter(source);
        let metadata = DocumentMetadata::parse_with(metadata_text, policy)?;
        let processor = MarkdownProcessor::new();

        let (title, content_html) = match metadata.title {
            Some(title) => (title, processor.convert(body, false).html),
            None => {
                let converted = processor.convert(body, true);
                let title = converted
                    .title_heading
                    .ok_or(DocumentError::MissingTitle)?;
                (title, converted.html)
            }
        };

        let slug = match metadata.slug {
            Some(explicit) => {
                normalize_slug(&explicit).ok_or(DocumentError::InvalidSlug(explicit))?
            }
            None => slugify(&title).ok_or_else(|| DocumentError::InvalidSlug(title.clone()))?,
        };

        Ok(Self {
            source_path: None,
            title,
            date: metadata.date,
            slug,
            content_html,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Rendered HTML body
    pub fn to_html(&self) -> &str {
        &self.content_html
    }

    /// File the document was read from, if any
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Output file name for this document under `layout`.
    pub fn file_name(&self, layout: PostLayout) -> String {
        match layout {
            PostLayout::Dated => format!("{}-{}.html", self.date.format("%Y-%m"), self.slug),
            PostLayout::Flat => format!("{}.html", self.slug),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parse(source: &str) -> Result<Document, DocumentError> {
        Document::from_source(source, DatePolicy::Strict)
    }

    #[test]
    fn test_front_matter_title_and_slug() {
        let doc = parse(
            "---\ntitle: Test Post\ndate: 2023-01-15T12:00:00Z\nslug: custom-slug\n---\n\n# Hello World\n\nThis is a test post.\n",
        )
        .unwrap();

        assert_eq!(doc.title(), "Test Post");
        assert_eq!(doc.slug(), "custom-slug");
        assert_eq!(doc.date(), Utc.with_ymd_and_hms(2023, 1, 15, 12, 0, 0).unwrap());
        assert_eq!(doc.file_name(PostLayout::Dated), "2023-01-custom-slug.html");
        assert_eq!(doc.file_name(PostLayout::Flat), "custom-slug.html");
        assert!(doc.to_html().contains("<h1>Hello World</h1>"));
        assert!(doc.to_html().contains("<p>This is a test post.</p>"));
        assert_eq!(doc.source_path(), None);
    }

    #[test]
    fn test_title_from_heading() {
        let doc = parse("---\ndate: 2023-01-15T12:00:00Z\n---\n\n# My First Post\n\nContent\n")
            .unwrap();

        assert_eq!(doc.title(), "My First Post");
        assert_eq!(doc.slug(), "my-first-post");
        assert_eq!(doc.file_name(PostLayout::Dated), "2023-01-my-first-post.html");
        assert!(!doc.to_html().contains("<h1>"));
        assert!(doc.to_html().contains("<p>Content</p>"));
    }

    #[test]
    fn test_title_from_lower_level_heading() {
        let doc = parse("---\ndate: 2023-01-15T12:00:00Z\n---\n## Notes\n\ntext").unwrap();

        assert_eq!(doc.title(), "Notes");
        assert_eq!(doc.slug(), "notes");
        assert!(doc.to_html().contains("<h2>Notes</h2>"));
        assert!(doc.to_html().contains("<p>text</p>"));
    }

    #[test]
    fn test_missing_date() {
        let err = parse("# Title\n\nNo front matter.").unwrap_err();
        assert!(matches!(
            err,
            DocumentError::Metadata(MetadataError::MissingDate)
        ));
    }

    #[test]
    fn test_missing_date_with_now_policy() {
        let doc = Document::from_source("# Draft\n\nText", DatePolicy::Now).unwrap();
        assert_eq!(doc.title(), "Draft");
    }

    #[test]
    fn test_invalid_date() {
        let err = parse("---\ndate: 2023-01-15\n---\n# T").unwrap_err();
        assert!(matches!(
            err,
            DocumentError::Metadata(MetadataError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_missing_title() {
        let err = parse("---\ndate: 2023-01-15T12:00:00Z\n---\nJust text, no heading.").unwrap_err();
        assert!(matches!(err, DocumentError::MissingTitle));
    }

    #[test]
    fn test_invalid_slug() {
        let err = parse("---\ndate: 2023-01-15T12:00:00Z\ntitle: 日本語\n---\nText").unwrap_err();
        assert!(matches!(err, DocumentError::InvalidSlug(ref t) if t == "日本語"));

        let err = parse("---\ndate: 2023-01-15T12:00:00Z\ntitle: Fine\nslug: \"!!!\"\n---\nText")
            .unwrap_err();
        assert!(matches!(err, DocumentError::InvalidSlug(ref s) if s == "!!!"));
    }

    #[test]
    fn test_explicit_slug_is_normalized() {
        let doc =
            parse("---\ndate: 2023-01-15T12:00:00Z\ntitle: Fine\nslug: Mixed_Case\n---\nText")
                .unwrap();
        assert_eq!(doc.slug(), "mixed-case");
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post.md");
        fs::write(&path, "---\ndate: 2023-06-01T08:30:00Z\n---\n# From Disk\n").unwrap();

        let doc = Document::parse(&path).unwrap();
        assert_eq!(doc.title(), "From Disk");
        assert_eq!(doc.source_path(), Some(path.as_path()));
    }

    #[test]
    fn test_parse_missing_file() {
        let err = Document::parse("/definitely/not/here.md").unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
        assert!(err.to_string().contains("here.md"));
    }
}
