//! Recursive change monitoring for the source tree.
//!
//! [`DirectoryMonitor`] keeps one watch per path under its root and publishes
//! a [`ChangeEvent`] for every relevant file system event. All watch-set
//! mutation happens on a single worker thread that drains one inbox holding
//! file system events, snapshot queries and the stop request.

pub mod watch_set;

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use thiserror::Error;

pub use watch_set::{Reconciliation, WatchBackend, WatchSet};

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Failed to initialize file watcher: {0}")]
    Init(#[source] notify::Error),

    #[error("Cannot monitor {path:?}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn monitor thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// What happened to a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Modify,
    Attribute,
    Remove,
    Rename,
    /// The backend lost events; anything under the root may have changed.
    Rescan,
}

impl ChangeKind {
    /// Access notifications and backend-specific events are not changes.
    pub fn from_event_kind(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(ChangeKind::Create),
            EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Rename),
            EventKind::Modify(ModifyKind::Metadata(_)) => Some(ChangeKind::Attribute),
            EventKind::Modify(_) | EventKind::Any => Some(ChangeKind::Modify),
            EventKind::Remove(_) => Some(ChangeKind::Remove),
            _ => None,
        }
    }

    /// Like [`ChangeKind::from_event_kind`], but a rescan request is always
    /// a change whatever kind it arrives with.
    pub fn from_event(event: &Event) -> Option<Self> {
        if event.need_rescan() {
            return Some(ChangeKind::Rescan);
        }
        Self::from_event_kind(&event.kind)
    }
}

/// A change somewhere under the monitored root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

enum Message {
    Fs(notify::Result<Event>),
    Snapshot(Sender<Vec<PathBuf>>),
    Stop,
}

enum State {
    Idle,
    Monitoring {
        inbox: Sender<Message>,
        worker: JoinHandle<()>,
    },
}

/// Watches a directory tree, following directories created or removed
/// while it runs.
pub struct DirectoryMonitor {
    root: PathBuf,
    state: State,
}

impl DirectoryMonitor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            state: State::Idle,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Monitoring { .. })
    }

    /// Start monitoring, publishing changes to `events`.
    ///
    /// The initial watch set is in place when this returns. Calling `start`
    /// on a running monitor does nothing.
    pub fn start(&mut self, events: Sender<ChangeEvent>) -> Result<(), MonitorError> {
        if self.is_running() {
            return Ok(());
        }

        std::fs::metadata(&self.root).map_err(|source| MonitorError::Root {
            path: self.root.clone(),
            source,
        })?;

        let (inbox, messages) = mpsc::channel();
        let fs_inbox = inbox.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = fs_inbox.send(Message::Fs(res));
            },
            notify::Config::default(),
        )
        .map_err(MonitorError::Init)?;

        let mut watch_set = WatchSet::new(&self.root);
        let initial = watch_set.reconcile(&mut watcher);
        tracing::debug!(
            "Monitoring {:?} with {} watches",
            self.root,
            initial.added.len()
        );

        let worker = thread::Builder::new()
            .name("bbg-monitor".to_string())
            .spawn(move || run_worker(watcher, watch_set, messages, events))
            .map_err(MonitorError::Spawn)?;

        self.state = State::Monitoring { inbox, worker };
        Ok(())
    }

    /// Stop monitoring and release every watch.
    ///
    /// No event is published after this returns. Stopping an idle monitor
    /// does nothing.
    pub fn stop(&mut self) {
        if let State::Monitoring { inbox, worker } = std::mem::replace(&mut self.state, State::Idle)
        {
            let _ = inbox.send(Message::Stop);
            if worker.join().is_err() {
                tracing::warn!("Monitor thread for {:?} panicked", self.root);
            }
        }
    }

    /// Paths currently holding a watch
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        let State::Monitoring { inbox, .. } = &self.state else {
            return Vec::new();
        };
        let (reply, snapshot) = mpsc::channel();
        if inbox.send(Message::Snapshot(reply)).is_err() {
            return Vec::new();
        }
        snapshot.recv().unwrap_or_default()
    }

    pub fn watch_count(&self) -> usize {
        self.watched_paths().len()
    }
}

impl Drop for DirectoryMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker<B: WatchBackend>(
    mut backend: B,
    mut watch_set: WatchSet,
    messages: Receiver<Message>,
    events: Sender<ChangeEvent>,
) {
    for message in messages {
        match message {
            Message::Stop => break,
            Message::Snapshot(reply) => {
                let _ = reply.send(watch_set.paths().cloned().collect());
            }
            Message::Fs(Ok(event)) => {
                let Some(kind) = ChangeKind::from_event(&event) else {
                    continue;
                };

                let change = watch_set.reconcile(&mut backend);
                if !change.is_empty() {
                    tracing::debug!(
                        "Watch set: +{} -{} ({} total)",
                        change.added.len(),
                        change.removed.len(),
                        watch_set.len()
                    );
                }

                let path = match kind {
                    ChangeKind::Rescan => None,
                    _ => event.paths.into_iter().next(),
                }
                .unwrap_or_else(|| watch_set.root().to_path_buf());
                tracing::trace!("{:?} {:?}", kind, path);

                if events.send(ChangeEvent { path, kind }).is_err() {
                    tracing::debug!("Change receiver dropped; monitor exiting");
                    break;
                }
            }
            Message::Fs(Err(e)) => tracing::warn!("Watcher error: {}", e),
        }
    }

    watch_set.clear(&mut backend);
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{
        AccessKind, CreateKind, DataChange, Flag, MetadataKind, RemoveKind, RenameMode,
    };

    struct NullBackend;

    impl WatchBackend for NullBackend {
        fn watch(&mut self, _path: &Path) -> notify::Result<()> {
            Ok(())
        }

        fn unwatch(&mut self, _path: &Path) -> notify::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_event_classification() {
        assert_eq!(
            ChangeKind::from_event_kind(&EventKind::Create(CreateKind::File)),
            Some(ChangeKind::Create)
        );
        assert_eq!(
            ChangeKind::from_event_kind(&EventKind::Modify(ModifyKind::Data(DataChange::Content))),
            Some(ChangeKind::Modify)
        );
        assert_eq!(
            ChangeKind::from_event_kind(&EventKind::Modify(ModifyKind::Metadata(
                MetadataKind::Permissions
            ))),
            Some(ChangeKind::Attribute)
        );
        assert_eq!(
            ChangeKind::from_event_kind(&EventKind::Modify(ModifyKind::Name(RenameMode::Both))),
            Some(ChangeKind::Rename)
        );
        assert_eq!(
            ChangeKind::from_event_kind(&EventKind::Remove(RemoveKind::Folder)),
            Some(ChangeKind::Remove)
        );
        assert_eq!(
            ChangeKind::from_event_kind(&EventKind::Access(AccessKind::Read)),
            None
        );
        assert_eq!(ChangeKind::from_event_kind(&EventKind::Other), None);
    }

    #[test]
    fn test_rescan_flag_is_a_change() {
        let rescan = Event::new(EventKind::Other).set_flag(Flag::Rescan);
        assert_eq!(ChangeKind::from_event(&rescan), Some(ChangeKind::Rescan));

        let plain = Event::new(EventKind::Other);
        assert_eq!(ChangeKind::from_event(&plain), None);

        let modify = Event::new(EventKind::Modify(ModifyKind::Any)).add_path("a.md".into());
        assert_eq!(ChangeKind::from_event(&modify), Some(ChangeKind::Modify));
    }

    #[test]
    fn test_worker_reconciles_and_publishes_on_rescan() {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("posts");
        std::fs::create_dir_all(&posts).unwrap();

        let (inbox, messages) = mpsc::channel();
        let (events, changes) = mpsc::channel();
        let (reply, snapshot) = mpsc::channel();
        inbox
            .send(Message::Fs(Ok(
                Event::new(EventKind::Other).set_flag(Flag::Rescan)
            )))
            .unwrap();
        inbox.send(Message::Snapshot(reply)).unwrap();
        inbox.send(Message::Stop).unwrap();

        run_worker(NullBackend, WatchSet::new(dir.path()), messages, events);

        assert_eq!(
            changes.try_recv().unwrap(),
            ChangeEvent {
                path: dir.path().to_path_buf(),
                kind: ChangeKind::Rescan,
            }
        );
        assert!(changes.try_recv().is_err());
        assert!(snapshot.recv().unwrap().contains(&posts));
    }

    #[test]
    fn test_idle_monitor() {
        let mut monitor = DirectoryMonitor::new("/nowhere");
        assert!(!monitor.is_running());
        assert_eq!(monitor.watch_count(), 0);
        monitor.stop();
    }

    #[test]
    fn test_missing_root_fails_to_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut monitor = DirectoryMonitor::new(dir.path().join("missing"));
        let (tx, _rx) = mpsc::channel();
        assert!(matches!(
            monitor.start(tx),
            Err(MonitorError::Root { .. })
        ));
        assert!(!monitor.is_running());
    }
}
