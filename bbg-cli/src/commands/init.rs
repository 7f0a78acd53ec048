//! Init command implementation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = include_str!("../../../config.yml.example");

/// Initialize a new site
pub fn init_project(path: Option<&Path>) -> Result<()> {
    let root = path.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(root).with_context(|| format!("Failed to create {:?}", root))?;

    write_config(root)?;
    scaffold_sources(root)?;

    println!("✓ bbg initialized in {:?}", root);
    println!("  - Edit config.yml to customize site metadata and theme");
    println!("  - Write posts in www/posts/ (or run `bbg new \"Title\"`)");
    Ok(())
}

fn write_config(root: &Path) -> Result<()> {
    let config_path = root.join("config.yml");
    if config_path.exists() {
        println!("config.yml already exists at {:?}", config_path);
        return Ok(());
    }

    fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {:?}", config_path))?;
    println!("Created {:?}", config_path);
    Ok(())
}

fn scaffold_sources(root: &Path) -> Result<()> {
    let src_root = root.join("www");
    let posts = src_root.join("posts");
    let pages = src_root.join("pages");
    let assets = src_root.join("static");

    for dir in [&src_root, &posts, &pages, &assets] {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }

    write_if_missing(&posts.join("welcome.md"), SAMPLE_POST)?;
    write_if_missing(&pages.join("about.md"), SAMPLE_PAGE)?;

    Ok(())
}

fn write_if_missing(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    println!("Created {:?}", path);
    Ok(())
}

const SAMPLE_POST: &str = r#"---
date: 2025-01-01T00:00:00Z
---

# Welcome to bbg

This is your first post. Edit `config.yml` to update the site title and theme, then run:

```bash
bbg build
bbg serve
```

Posts live in `www/posts/`. Every post needs a `date` in its front matter; the title comes
from a `title` field or from the first `# Heading`.
"#;

const SAMPLE_PAGE: &str = r#"---
date: 2025-01-01T00:00:00Z
title: About
---

Pages in `www/pages/` are rendered to `pages/{slug}.html` and never show up in the post list.
"#;
