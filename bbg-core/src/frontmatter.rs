//! Front matter splitting for Markdown sources.

use regex::Regex;
use std::sync::OnceLock;

static FRONT_MATTER_REGEX: OnceLock<Regex> = OnceLock::new();

// The closing fence is the first line that is exactly `---`, followed by a
// newline or the end of input.
fn front_matter_regex() -> &'static Regex {
    FRONT_MATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?s)\A---\r?\n(?:(.*?)\r?\n)?---(?:\r?\n(.*))?\z")
            .expect("front matter pattern is valid")
    })
}

/// Split a source file into its metadata block and Markdown body.
///
/// Returns `(metadata, body)`. When the text opens with a `---` line and a
/// later line is exactly `---`, both parts come back trimmed of surrounding
/// whitespace. Otherwise the metadata is empty and the body is the input,
/// untouched.
///
/// # Example
///
/// ```
/// use bbg_core::split_front_matter;
///
/// let (meta, body) = split_front_matter("---\ndate: 2023-01-15T12:00:00Z\n---\n# Hello\n");
/// assert_eq!(meta, "date: 2023-01-15T12:00:00Z");
/// assert_eq!(body, "# Hello");
/// ```
pub fn split_front_matter(content: &str) -> (&str, &str) {
    match front_matter_regex().captures(content) {
        Some(captures) => {
            let metadata = captures.get(1).map_or("", |m| m.as_str());
            let body = captures.get(2).map_or("", |m| m.as_str());
            (metadata.trim(), body.trim())
        }
        None => ("", content),
    }
}
