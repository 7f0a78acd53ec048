//! Site building logic - orchestrates parsing, rendering, and output.
//!
//! A build renders into a staging directory next to the output directory and
//! only replaces the published site once every step has succeeded, so a
//! failed build leaves the previous output untouched.

use crate::config::Config;
use crate::document::{Document, DocumentError};
use bbg_render::{
    BaseContext, Context, FeedItem, FeedView, NavLink, PageView, Palette, PostView, RenderError,
    TemplateEngine, FEED, INDEX, PAGE, POST, STYLESHEET,
};
use chrono::Utc;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use thiserror::Error;
use walkdir::WalkDir;

/// Number of posts included in the RSS feed
pub const FEED_LIMIT: usize = 10;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Failed to parse {path:?}: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{first:?} and {second:?} both render to {file_name}")]
    DuplicateOutput {
        file_name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl BuildError {
    /// Source or output path the failure is about, when there is one
    pub fn path(&self) -> Option<&Path> {
        match self {
            BuildError::Document { path, .. } | BuildError::Io { path, .. } => Some(path),
            BuildError::DuplicateOutput { second, .. } => Some(second),
            BuildError::Render(_) => None,
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> BuildError + '_ {
    move |source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Summary of a successful build
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub posts: usize,
    pub pages: usize,
    pub static_files: usize,
    pub output_dir: PathBuf,
    pub elapsed: Duration,
}

/// Main site builder
pub struct SiteBuilder {
    config: Config,
    engine: TemplateEngine,
}

impl SiteBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            engine: TemplateEngine::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the entire site.
    ///
    /// Stops at the first failure; the error names the file involved.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let started = Instant::now();
        let output_dir = self.config.build_dir();
        tracing::info!("Building site: {}", self.config.title);

        let staging = create_staging_dir(&output_dir)?;
        let out = staging.path();
        let base = self.base_context();

        let mut posts = self.load_documents(&self.config.posts_dir())?;
        sort_posts(&mut posts);
        tracing::info!("Parsed {} posts", posts.len());

        let post_views = self.render_posts(out, &base, &posts)?;
        self.render_feed(out, &base, &posts, &post_views)?;

        let pages = self.load_documents(&self.config.pages_dir())?;
        self.render_pages(out, &base, &pages)?;

        self.render_index(out, &base, &post_views)?;
        self.render_stylesheet(out, &base)?;
        let static_files = self.copy_static(out)?;

        publish(staging, &output_dir)?;

        let report = BuildReport {
            posts: posts.len(),
            pages: pages.len(),
            static_files,
            output_dir,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            "✓ Built {} posts and {} pages in {:?}",
            report.posts,
            report.pages,
            report.elapsed
        );
        tracing::info!("✓ Output written to {:?}", report.output_dir);
        Ok(report)
    }

    /// Site-wide template values derived from the configuration
    pub fn base_context(&self) -> BaseContext {
        let config = &self.config;
        BaseContext {
            site_title: config.title.clone(),
            tagline: config.tag_line.clone(),
            site_url: config.site_url.clone(),
            base_path: config.base_path(),
            links: config
                .links
                .iter()
                .map(|link| NavLink {
                    name: link.name.clone(),
                    url: link.url.clone(),
                })
                .collect(),
            footer: config.footer.clone(),
            default_theme: config.theme_mode().to_string(),
            light: palette(&config.theme.light),
            dark: palette(&config.theme.dark),
        }
    }

    fn load_documents(&self, dir: &Path) -> Result<Vec<Document>, BuildError> {
        if !dir.is_dir() {
            tracing::debug!("No directory at {:?}; nothing to parse", dir);
            return Ok(Vec::new());
        }

        let mut documents = Vec::new();
        for path in discover_markdown_files(dir)? {
            tracing::debug!("Parsing {:?}", path);
            let document = Document::parse_with(&path, self.config.missing_date)
                .map_err(|source| BuildError::Document {
                    path: path.clone(),
                    source,
                })?;
            documents.push(document);
        }
        Ok(documents)
    }

    fn render_posts(
        &self,
        out: &Path,
        base: &BaseContext,
        posts: &[Document],
    ) -> Result<Vec<PostView>, BuildError> {
        let posts_dir = out.join("posts");
        fs::create_dir_all(&posts_dir).map_err(io_error(&posts_dir))?;

        let mut claimed: HashMap<String, PathBuf> = HashMap::new();
        let mut views = Vec::with_capacity(posts.len());

        for post in posts {
            let file_name = post.file_name(self.config.permalinks);
            claim(&mut claimed, &file_name, post)?;

            let view = PostView {
                title: post.title().to_string(),
                date: post.date().to_rfc3339(),
                formatted_date: post.date().format("%Y-%m-%d").to_string(),
                url: format!("posts/{}", file_name),
                content: post.to_html().to_string(),
            };
            let html = self
                .engine
                .render(POST, &Context::new(base).with_post(&view))?;
            write_output(&posts_dir.join(&file_name), &html)?;
            tracing::debug!("Rendered: {}", view.url);

            views.push(view);
        }

        Ok(views)
    }

    fn render_feed(
        &self,
        out: &Path,
        base: &BaseContext,
        posts: &[Document],
        views: &[PostView],
    ) -> Result<(), BuildError> {
        let site_url = self.config.site_url.trim().trim_end_matches('/');
        let items = posts
            .iter()
            .zip(views)
            .take(FEED_LIMIT)
            .map(|(post, view)| FeedItem {
                title: view.title.clone(),
                link: format!("{}/{}", site_url, view.url),
                pub_date: post.date().to_rfc2822(),
                content: view.content.clone(),
            })
            .collect();

        let feed = FeedView {
            build_date: Utc::now().to_rfc2822(),
            items,
        };
        let xml = self
            .engine
            .render(FEED, &Context::new(base).with_feed(&feed))?;
        write_output(&out.join(FEED), &xml)?;
        tracing::info!("Generated rss.xml with {} items", feed.items.len());
        Ok(())
    }

    fn render_pages(
        &self,
        out: &Path,
        base: &BaseContext,
        pages: &[Document],
    ) -> Result<(), BuildError> {
        let pages_dir = out.join("pages");
        let mut claimed: HashMap<String, PathBuf> = HashMap::new();

        for page in pages {
            let file_name = format!("{}.html", page.slug());
            claim(&mut claimed, &file_name, page)?;

            let view = PageView {
                title: page.title().to_string(),
                content: page.to_html().to_string(),
            };
            let html = self
                .engine
                .render(PAGE, &Context::new(base).with_page(&view))?;
            write_output(&pages_dir.join(&file_name), &html)?;
            tracing::debug!("Rendered page: {}", file_name);
        }

        Ok(())
    }

    fn render_index(
        &self,
        out: &Path,
        base: &BaseContext,
        posts: &[PostView],
    ) -> Result<(), BuildError> {
        let html = self
            .engine
            .render(INDEX, &Context::new(base).with_posts(posts))?;
        write_output(&out.join(INDEX), &html)
    }

    fn render_stylesheet(&self, out: &Path, base: &BaseContext) -> Result<(), BuildError> {
        let css = self.engine.render(STYLESHEET, &Context::new(base))?;
        write_output(&out.join(STYLESHEET), &css)
    }

    fn copy_static(&self, out: &Path) -> Result<usize, BuildError> {
        let static_dir = self.config.static_dir();
        if !static_dir.is_dir() {
            return Ok(0);
        }
        let copied = copy_dir(&static_dir, &out.join("static"))?;
        tracing::info!("Copied {} static files from {:?}", copied, static_dir);
        Ok(copied)
    }
}

/// Order posts newest first; posts sharing a date keep their discovery order.
pub fn sort_posts(posts: &mut [Document]) {
    posts.sort_by(|a, b| b.date().cmp(&a.date()));
}

/// All `.md` files under `dir`, in a stable (file name) order
///
/// Symlinked files count as files. Entries that cannot be read fail the
/// walk instead of silently shrinking the site.
pub fn discover_markdown_files(dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(dir, e))?;
        if entry.path().is_file() && entry.path().extension().is_some_and(|ext| ext == "md") {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn walk_error(root: &Path, err: walkdir::Error) -> BuildError {
    let path = err.path().unwrap_or(root).to_path_buf();
    BuildError::Io {
        path,
        source: io::Error::from(err),
    }
}

fn claim(
    claimed: &mut HashMap<String, PathBuf>,
    file_name: &str,
    document: &Document,
) -> Result<(), BuildError> {
    let source = document.source_path().map(Path::to_path_buf).unwrap_or_default();
    if let Some(first) = claimed.get(file_name) {
        return Err(BuildError::DuplicateOutput {
            file_name: file_name.to_string(),
            first: first.clone(),
            second: source,
        });
    }
    claimed.insert(file_name.to_string(), source);
    Ok(())
}

fn palette(colors: &crate::config::ThemeColors) -> Palette {
    Palette {
        background: colors.background.clone(),
        text: colors.text.clone(),
        link: colors.link.clone(),
        code_bg: colors.code_bg.clone(),
        border: colors.border.clone(),
        code_border_left: colors.code_border_left.clone(),
        secondary_text: colors.secondary_text.clone(),
    }
}

fn write_output(path: &Path, contents: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    fs::write(path, contents).map_err(io_error(path))
}

fn copy_dir(src: &Path, dest: &Path) -> Result<usize, BuildError> {
    let mut copied = 0;
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| walk_error(src, e))?;
        if !entry.path().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dest.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        fs::copy(entry.path(), &target).map_err(io_error(entry.path()))?;
        copied += 1;
    }
    Ok(copied)
}

// Staging lives beside the output directory so the final rename never
// crosses a filesystem boundary.
fn create_staging_dir(output_dir: &Path) -> Result<TempDir, BuildError> {
    let parent = match output_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(io_error(parent))?;

    let name = output_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "site".to_string());

    tempfile::Builder::new()
        .prefix(&format!(".{}.staging-", name))
        .tempdir_in(parent)
        .map_err(io_error(parent))
}

fn publish(staging: TempDir, output_dir: &Path) -> Result<(), BuildError> {
    let staged = staging.keep();
    if let Err(err) = swap_into_place(&staged, output_dir) {
        let _ = fs::remove_dir_all(&staged);
        return Err(err);
    }

    // Temporary directories are created owner-only.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(output_dir, fs::Permissions::from_mode(0o755))
            .map_err(io_error(output_dir))?;
    }

    Ok(())
}

/// Move `staged` to `output_dir`. An existing output is renamed aside first
/// and only deleted once the new tree is in place; if the swap fails it is
/// renamed back.
fn swap_into_place(staged: &Path, output_dir: &Path) -> Result<(), BuildError> {
    let mut previous = staged.as_os_str().to_os_string();
    previous.push(".previous");
    let previous = PathBuf::from(previous);

    let had_output = match fs::rename(output_dir, &previous) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(source) => {
            return Err(BuildError::Io {
                path: output_dir.to_path_buf(),
                source,
            })
        }
    };

    if let Err(source) = fs::rename(staged, output_dir) {
        if had_output {
            if let Err(e) = fs::rename(&previous, output_dir) {
                tracing::error!(
                    "Failed to restore {:?} from {:?}: {}",
                    output_dir,
                    previous,
                    e
                );
            }
        }
        return Err(BuildError::Io {
            path: output_dir.to_path_buf(),
            source,
        });
    }

    if had_output {
        if let Err(e) = fs::remove_dir_all(&previous) {
            tracing::warn!("Failed to remove previous output {:?}: {}", previous, e);
        }
    }
    Ok(())
}
