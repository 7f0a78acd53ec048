//! Build command implementation.

use super::watch::LiveRebuild;
use anyhow::{Context, Result};
use bbg_core::{Config, SiteBuilder};
use std::path::Path;

/// Build the static site once
pub fn build_site(config_path: &Path) -> Result<()> {
    tracing::info!("Loading config from {:?}", config_path);
    let builder = SiteBuilder::new(Config::load(config_path));
    let report = builder.build().context("Failed to build site")?;

    println!(
        "✓ Built {} posts, {} pages and {} static files into {:?}",
        report.posts, report.pages, report.static_files, report.output_dir
    );
    Ok(())
}

/// Build, then keep rebuilding on source changes until Ctrl+C
pub async fn build_and_watch(config_path: &Path) -> Result<()> {
    tracing::info!("Loading config from {:?}", config_path);
    let builder = SiteBuilder::new(Config::load(config_path));

    if let Err(e) = builder.build() {
        tracing::error!("Build failed: {}", e);
    }

    let live = LiveRebuild::start(builder)?;
    println!("   Press Ctrl+C to stop\n");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    live.stop();
    Ok(())
}
