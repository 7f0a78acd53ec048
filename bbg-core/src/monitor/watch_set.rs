//! Per-path watch bookkeeping for a source tree.
//!
//! Every directory and file under the root gets its own non-recursive
//! watch. After each change the tree is rescanned and the set of watches is
//! reconciled against it: new paths are watched, vanished paths released.

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Something that can hold individual path watches
pub trait WatchBackend {
    fn watch(&mut self, path: &Path) -> notify::Result<()>;
    fn unwatch(&mut self, path: &Path) -> notify::Result<()>;
}

impl WatchBackend for RecommendedWatcher {
    fn watch(&mut self, path: &Path) -> notify::Result<()> {
        Watcher::watch(self, path, RecursiveMode::NonRecursive)
    }

    fn unwatch(&mut self, path: &Path) -> notify::Result<()> {
        Watcher::unwatch(self, path)
    }
}

/// Paths that changed during one reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub added: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// The set of paths currently holding a watch
#[derive(Debug)]
pub struct WatchSet {
    root: PathBuf,
    watched: BTreeSet<PathBuf>,
}

impl WatchSet {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            watched: BTreeSet::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.watched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.watched.contains(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.watched.iter()
    }

    /// Rescan the tree and bring the watches in line with it.
    ///
    /// A path that cannot be watched (it vanished mid-scan, permissions, ...)
    /// is skipped and tried again on the next reconciliation.
    pub fn reconcile<B: WatchBackend>(&mut self, backend: &mut B) -> Reconciliation {
        let current = scan(&self.root);

        let removed: Vec<PathBuf> = self.watched.difference(&current).cloned().collect();
        for path in &removed {
            if let Err(e) = backend.unwatch(path) {
                tracing::trace!("Unwatch {:?}: {}", path, e);
            }
            self.watched.remove(path);
        }

        let candidates: Vec<PathBuf> = current.difference(&self.watched).cloned().collect();
        let mut added = Vec::with_capacity(candidates.len());
        for path in candidates {
            match backend.watch(&path) {
                Ok(()) => {
                    self.watched.insert(path.clone());
                    added.push(path);
                }
                Err(e) => tracing::debug!("Skipping watch on {:?}: {}", path, e),
            }
        }

        Reconciliation { added, removed }
    }

    /// Release every watch
    pub fn clear<B: WatchBackend>(&mut self, backend: &mut B) {
        for path in std::mem::take(&mut self.watched) {
            if let Err(e) = backend.unwatch(&path) {
                tracing::trace!("Unwatch {:?}: {}", path, e);
            }
        }
    }
}

/// Every directory and file under `root`, the root included
pub fn scan(root: &Path) -> BTreeSet<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .collect()
}
