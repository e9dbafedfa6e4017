//! Filesystem watching for archive files.
//!
//! Wraps a `notify` watcher with a debounce map so editor-style bursts of
//! raw events collapse into one [`ChangeEvent`] per archive. The browser
//! consumes those events through its change-notification boundary.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::debug;

use crate::browser::{ARCHIVE_EXTENSION, ChangeEvent};

const DEFAULT_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawKind {
    Created,
    Modified,
    Deleted,
}

struct Pending {
    kind: RawKind,
    last_seen: Instant,
}

/// Debounced recursive watcher that yields change events for `*.zip` files.
pub struct ArchiveWatcher {
    watcher: RecommendedWatcher,
    rx: mpsc::Receiver<Result<Event, notify::Error>>,
    pending: HashMap<PathBuf, Pending>,
    debounce: Duration,
}

impl ArchiveWatcher {
    pub fn new() -> Result<Self> {
        Self::with_debounce(Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }

    pub fn with_debounce(debounce: Duration) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let watcher = notify::recommended_watcher(tx)?;
        Ok(Self {
            watcher,
            rx,
            pending: HashMap::new(),
            debounce,
        })
    }

    /// Start watching a directory tree. Unsubscription happens when the
    /// watcher is dropped.
    pub fn watch(&mut self, root: &Path) -> Result<()> {
        self.watcher.watch(root, RecursiveMode::Recursive)?;
        Ok(())
    }

    /// Drain raw notifications and return the events whose debounce window
    /// has elapsed.
    pub fn poll_events(&mut self) -> Vec<ChangeEvent> {
        let now = Instant::now();

        while let Ok(result) = self.rx.try_recv() {
            if let Ok(event) = result {
                self.absorb(event, now);
            }
        }

        let debounce = self.debounce;
        let mut ready = Vec::new();
        self.pending.retain(|path, pending| {
            if now.duration_since(pending.last_seen) < debounce {
                return true;
            }
            ready.push(match pending.kind {
                RawKind::Created => ChangeEvent::Created(path.clone()),
                RawKind::Modified => ChangeEvent::Modified(path.clone()),
                RawKind::Deleted => ChangeEvent::Deleted(path.clone()),
            });
            false
        });
        ready
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn absorb(&mut self, event: Event, now: Instant) {
        let kind = match event.kind {
            EventKind::Create(_) => RawKind::Created,
            EventKind::Modify(_) => RawKind::Modified,
            EventKind::Remove(_) => RawKind::Deleted,
            _ => return,
        };

        for path in event.paths {
            if !is_archive_path(&path) {
                continue;
            }
            debug!(path = %path.display(), ?kind, "raw archive event");
            match self.pending.get_mut(&path) {
                Some(existing) => {
                    existing.kind = merge(existing.kind, kind);
                    existing.last_seen = now;
                }
                None => {
                    self.pending.insert(path, Pending { kind, last_seen: now });
                }
            }
        }
    }
}

fn is_archive_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

/// Collapse consecutive raw events on one path into the event the consumer
/// should see.
fn merge(old: RawKind, new: RawKind) -> RawKind {
    match (old, new) {
        (RawKind::Created, RawKind::Modified) => RawKind::Created,
        (RawKind::Deleted, RawKind::Created) => RawKind::Modified,
        (_, new) => new,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_archive_extensions_are_watched() {
        assert!(is_archive_path(Path::new("/ws/data.zip")));
        assert!(is_archive_path(Path::new("/ws/DATA.ZIP")));
        assert!(!is_archive_path(Path::new("/ws/data.tar")));
        assert!(!is_archive_path(Path::new("/ws/zip")));
    }

    #[test]
    fn merge_collapses_event_bursts() {
        assert_eq!(merge(RawKind::Created, RawKind::Modified), RawKind::Created);
        assert_eq!(merge(RawKind::Deleted, RawKind::Created), RawKind::Modified);
        assert_eq!(merge(RawKind::Created, RawKind::Deleted), RawKind::Deleted);
        assert_eq!(
            merge(RawKind::Modified, RawKind::Modified),
            RawKind::Modified
        );
    }

    #[test]
    fn watcher_starts_with_nothing_pending() {
        let watcher = ArchiveWatcher::new().unwrap();
        assert!(!watcher.has_pending());
    }

    #[test]
    fn watch_accepts_a_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut watcher = ArchiveWatcher::new().unwrap();
        assert!(watcher.watch(dir.path()).is_ok());
    }
}
