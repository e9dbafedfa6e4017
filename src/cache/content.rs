//! Bounded least-recently-used store for decoded preview text.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

/// Qualifier separating differently-decoded views of the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewMode {
    Text,
    Binary,
}

/// Stable identity of one cached preview: two requests for the same entry in
/// the same archive land on the same slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewKey {
    pub archive: PathBuf,
    pub internal_path: String,
    pub mode: PreviewMode,
}

impl PreviewKey {
    pub fn text(archive: &Path, internal_path: &str) -> Self {
        PreviewKey {
            archive: archive.to_path_buf(),
            internal_path: internal_path.to_string(),
            mode: PreviewMode::Text,
        }
    }
}

struct Slot {
    text: String,
    stamp: u64,
}

/// LRU cache of decoded text, so repeated previews of the same entry skip
/// the decode.
///
/// `get` promotes the entry to most-recently-used; `put` evicts the
/// least-recently-used entries once the configured capacity is exceeded.
/// Recency is a monotonic stamp per access; eviction scans for the minimum,
/// which is fine at the double-digit capacities this cache runs with.
#[derive(Default)]
pub struct ContentCache {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    slots: HashMap<PreviewKey, Slot>,
    clock: u64,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &PreviewKey) -> Option<String> {
        let mut inner = self.lock();
        inner.clock += 1;
        let clock = inner.clock;
        let slot = inner.slots.get_mut(key)?;
        slot.stamp = clock;
        Some(slot.text.clone())
    }

    /// Insert a decoded preview, evicting oldest-accessed entries if the
    /// cache would exceed `capacity`. Capacity is passed per call because it
    /// is a live setting, not a construction-time constant.
    pub fn put(&self, key: PreviewKey, text: String, capacity: usize) {
        let mut inner = self.lock();
        inner.clock += 1;
        let stamp = inner.clock;
        inner.slots.insert(key, Slot { text, stamp });

        while inner.slots.len() > capacity.max(1) {
            let Some(oldest) = inner
                .slots
                .iter()
                .min_by_key(|(_, slot)| slot.stamp)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            debug!(entry = %oldest.internal_path, "evicting preview from content cache");
            inner.slots.remove(&oldest);
        }
    }

    pub fn invalidate(&self, key: &PreviewKey) {
        self.lock().slots.remove(key);
    }

    /// Drop every cached preview that came from `archive`. Used by the
    /// change-notification boundary when the file is rewritten or deleted.
    pub fn invalidate_archive(&self, archive: &Path) {
        self.lock().slots.retain(|key, _| key.archive != archive);
    }

    pub fn clear(&self) {
        self.lock().slots.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
