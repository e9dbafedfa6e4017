//! Cache of parsed archive indexes, keyed by filesystem path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::error::ExtractError;
use crate::zip::ArchiveIndex;

/// At most one parsed [`ArchiveIndex`] per archive path.
///
/// Deliberately unbounded: a workspace holds few archives and parsing one is
/// the expensive step worth keeping. Entries leave only through
/// [`invalidate`](Self::invalidate) (driven by change notifications) or
/// [`clear`](Self::clear) at teardown. A bounded variant would be a stricter
/// alternative, not a correction.
///
/// The map's mutex is only ever held for synchronous map operations, never
/// across an await. Two concurrent loads of the same path may both run;
/// whichever finishes last stays cached (last-write-wins, both parses are
/// equivalent).
#[derive(Default)]
pub struct ArchiveCache {
    indexes: Mutex<HashMap<PathBuf, Arc<ArchiveIndex>>>,
}

impl ArchiveCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached index for `path`, loading it on a miss.
    ///
    /// A failed load leaves no cache entry behind, so the next call retries
    /// from scratch.
    pub async fn get_or_load(&self, path: &Path) -> Result<Arc<ArchiveIndex>, ExtractError> {
        if let Some(index) = self.lock().get(path).cloned() {
            debug!(archive = %path.display(), "archive cache hit");
            return Ok(index);
        }

        debug!(archive = %path.display(), "archive cache miss, loading");
        let index = Arc::new(ArchiveIndex::load(path).await?);
        self.lock().insert(path.to_path_buf(), Arc::clone(&index));
        Ok(index)
    }

    /// Drop any cached index for `path`. Must run before a re-scan whenever
    /// the file changes on disk, so a stale parse is never served.
    pub fn invalidate(&self, path: &Path) {
        if self.lock().remove(path).is_some() {
            info!(archive = %path.display(), "invalidated cached archive index");
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Arc<ArchiveIndex>>> {
        self.indexes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidate_unknown_path_is_a_noop() {
        let cache = ArchiveCache::new();
        cache.invalidate(Path::new("/not/cached.zip"));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn failed_load_leaves_no_entry() {
        let cache = ArchiveCache::new();
        let result = cache.get_or_load(Path::new("/no/such/archive.zip")).await;
        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
