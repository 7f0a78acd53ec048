//! Scaffold a new post.

use anyhow::{bail, Context, Result};
use bbg_core::metadata::{parse_date, DATE_FORMAT};
use bbg_core::{slugify, Config};
use chrono::{NaiveDate, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Default)]
pub struct NewPostOptions {
    /// `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SSZ`; defaults to now
    pub date: Option<String>,
    pub slug: Option<String>,
    /// Open the new file in `$EDITOR`
    pub edit: bool,
}

/// Create `posts/{slug}.md` under the configured source directory
pub fn new_post(config_path: &Path, title: &str, opts: NewPostOptions) -> Result<PathBuf> {
    let config = Config::load(config_path);
    let posts_dir = config.posts_dir();

    let date = match opts.date.as_deref() {
        Some(raw) => normalize_date(raw)?,
        None => Utc::now().format(DATE_FORMAT).to_string(),
    };
    let slug = match opts.slug.as_deref() {
        Some(raw) => slugify(raw)
            .with_context(|| format!("Slug {:?} has no URL-safe characters", raw))?,
        None => slugify(title).unwrap_or_else(|| "post".to_string()),
    };

    let path = posts_dir.join(format!("{}.md", slug));
    if path.exists() {
        bail!("{:?} already exists", path);
    }

    fs::create_dir_all(&posts_dir)
        .with_context(|| format!("Failed to create {:?}", posts_dir))?;
    fs::write(&path, post_template(&date, &slug, title))
        .with_context(|| format!("Failed to write {:?}", path))?;
    println!("Created {:?}", path);

    if opts.edit {
        launch_editor(&path)?;
    }

    Ok(path)
}

fn normalize_date(raw: &str) -> Result<String> {
    if parse_date(raw).is_ok() {
        return Ok(raw.to_string());
    }
    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| {
        format!("Invalid date {:?}: expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SSZ", raw)
    })?;
    let midnight = day
        .and_hms_opt(0, 0, 0)
        .with_context(|| format!("Invalid date {:?}", raw))?;
    Ok(midnight.format(DATE_FORMAT).to_string())
}

fn post_template(date: &str, slug: &str, title: &str) -> String {
    format!("---\ndate: {}\nslug: {}\n---\n\n# {}\n\n", date, slug, title)
}

fn launch_editor(path: &Path) -> Result<()> {
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());
    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        bail!("$EDITOR is empty");
    };

    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to launch editor '{}'", editor))?;
    if !status.success() {
        tracing::warn!("Editor exited with {}", status);
    }
    Ok(())
}
