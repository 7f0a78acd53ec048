//! Development server: build, watch, and serve the output directory.

use super::watch::LiveRebuild;
use anyhow::{Context, Result};
use axum::Router;
use bbg_core::{Config, SiteBuilder};
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Start the development server
pub async fn serve_site(config_path: &Path, hostname: &str, port: u16, open: bool) -> Result<()> {
    let site_url = format!("http://{}:{}", hostname, port);
    let config = Config::load(config_path).with_site_url(&site_url);
    let output_dir = config.build_dir();
    let builder = SiteBuilder::new(config);

    // A broken post should not keep the server from starting.
    if let Err(e) = builder.build() {
        tracing::error!("Initial build failed: {}", e);
    }

    let live = LiveRebuild::start(builder)?;

    let app = Router::new()
        .fallback_service(ServeDir::new(&output_dir))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", hostname, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Starting dev server on {}", site_url);
    println!("\n  Serving at {}", site_url);
    println!("   Press Ctrl+C to stop\n");

    if open {
        if let Err(e) = open::that(&site_url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    live.stop();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
    }
}
