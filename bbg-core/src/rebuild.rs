//! Debounced rebuilds driven by change events.

use crate::builder::SiteBuilder;
use crate::monitor::ChangeEvent;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

/// Quiet period that closes a batch of changes
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Rebuilds the site whenever a burst of changes settles
pub struct RebuildLoop {
    builder: SiteBuilder,
    debounce: Duration,
}

impl RebuildLoop {
    pub fn new(builder: SiteBuilder) -> Self {
        Self {
            builder,
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn builder(&self) -> &SiteBuilder {
        &self.builder
    }

    /// Block for the next change, then collect everything that follows it
    /// until the stream is quiet for the debounce period.
    ///
    /// Returns `None` once the sender side is gone and nothing is pending.
    pub fn next_batch(&self, events: &Receiver<ChangeEvent>) -> Option<Vec<ChangeEvent>> {
        let first = events.recv().ok()?;
        let mut batch = vec![first];
        loop {
            match events.recv_timeout(self.debounce) {
                Ok(event) => batch.push(event),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        Some(batch)
    }

    /// Rebuild once per batch until the event stream closes.
    ///
    /// A failed rebuild is logged and the loop keeps waiting; the previous
    /// output stays in place.
    pub fn run(&self, events: Receiver<ChangeEvent>) {
        while let Some(batch) = self.next_batch(&events) {
            tracing::info!(
                "Change detected in {:?} ({} events), rebuilding...",
                batch[0].path,
                batch.len()
            );
            match self.builder.build() {
                Ok(report) => tracing::info!("✓ Rebuilt in {:?}", report.elapsed),
                Err(e) => tracing::error!("Rebuild failed: {}", e),
            }
        }
        tracing::debug!("Change stream closed; rebuild loop exiting");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::monitor::ChangeKind;
    use std::path::PathBuf;
    use std::sync::mpsc;

    fn event(name: &str) -> ChangeEvent {
        ChangeEvent {
            path: PathBuf::from(name),
            kind: ChangeKind::Modify,
        }
    }

    #[test]
    fn test_burst_becomes_one_batch() {
        let rebuild = RebuildLoop::new(SiteBuilder::new(Config::default()))
            .with_debounce(Duration::from_millis(50));
        let (tx, rx) = mpsc::channel();
        tx.send(event("a.md")).unwrap();
        tx.send(event("b.md")).unwrap();
        tx.send(event("c.md")).unwrap();

        let batch = rebuild.next_batch(&rx).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].path, PathBuf::from("a.md"));
    }

    #[test]
    fn test_closed_stream_ends_batches() {
        let rebuild = RebuildLoop::new(SiteBuilder::new(Config::default()));
        let (tx, rx) = mpsc::channel();
        tx.send(event("last.md")).unwrap();
        drop(tx);

        assert_eq!(rebuild.next_batch(&rx).map(|b| b.len()), Some(1));
        assert!(rebuild.next_batch(&rx).is_none());
    }
}
