//! Rebuild-on-change plumbing shared by `build --watch` and `serve`.

use anyhow::{Context, Result};
use bbg_core::{DirectoryMonitor, RebuildLoop, SiteBuilder};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

/// A running monitor feeding a rebuild loop on its own thread
pub struct LiveRebuild {
    monitor: DirectoryMonitor,
    worker: Option<JoinHandle<()>>,
}

impl LiveRebuild {
    pub fn start(builder: SiteBuilder) -> Result<Self> {
        let source_dir = builder.config().source_dir();
        let (tx, rx) = mpsc::channel();

        let mut monitor = DirectoryMonitor::new(&source_dir);
        monitor
            .start(tx)
            .with_context(|| format!("Failed to watch {:?}", source_dir))?;

        let rebuild = RebuildLoop::new(builder);
        let worker = thread::Builder::new()
            .name("bbg-rebuild".to_string())
            .spawn(move || rebuild.run(rx))
            .context("Failed to spawn rebuild thread")?;

        println!(
            "Watching {:?} for changes ({} paths)",
            source_dir,
            monitor.watch_count()
        );

        Ok(Self {
            monitor,
            worker: Some(worker),
        })
    }

    /// Stop watching and wait for any in-flight rebuild to finish
    pub fn stop(mut self) {
        // Stopping the monitor closes the event stream, which ends the loop.
        self.monitor.stop();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("Rebuild thread panicked");
            }
        }
    }
}
