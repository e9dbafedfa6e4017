//! Validated extraction of entry bytes and text previews.
//!
//! Every read of archive content funnels through [`Extractor::extract`]:
//! sanitize the internal path, obtain the cached index, look up the entry,
//! run the safety gate on its declared sizes, and only then decode. No
//! caller gets a byte that skipped any of those steps.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::cache::{ArchiveCache, ContentCache, PreviewKey};
use crate::error::ExtractError;
use crate::safety::{self, ExtractLimits};
use crate::vfs;

pub struct Extractor {
    archives: Arc<ArchiveCache>,
    previews: Arc<ContentCache>,
}

impl Extractor {
    pub fn new(archives: Arc<ArchiveCache>, previews: Arc<ContentCache>) -> Self {
        Self { archives, previews }
    }

    /// Produce the raw bytes of one entry, or the first failure along the
    /// pipeline. Binary callers (image viewers) use this directly; nothing
    /// is cached here.
    pub async fn extract(
        &self,
        archive: &Path,
        raw_internal_path: &str,
        limits: &ExtractLimits,
    ) -> Result<Vec<u8>, ExtractError> {
        let internal = vfs::sanitize(raw_internal_path).ok_or(ExtractError::InvalidPath)?;

        let index = self.archives.get_or_load(archive).await?;

        let entry = index
            .entry(internal.as_str())
            .ok_or_else(|| ExtractError::NotFound {
                path: internal.as_str().to_string(),
            })?;

        safety::check(entry.compressed_size, entry.uncompressed_size, limits)?;

        index.read_entry(entry).await
    }

    /// Produce one entry decoded as text, consulting the preview cache
    /// first and populating it on success.
    pub async fn preview_text(
        &self,
        archive: &Path,
        raw_internal_path: &str,
        limits: &ExtractLimits,
        cache_capacity: usize,
    ) -> Result<String, ExtractError> {
        let internal = vfs::sanitize(raw_internal_path).ok_or(ExtractError::InvalidPath)?;
        let key = PreviewKey::text(archive, internal.as_str());

        if let Some(text) = self.previews.get(&key) {
            debug!(entry = internal.as_str(), "preview served from cache");
            return Ok(text);
        }

        let bytes = self.extract(archive, internal.as_str(), limits).await?;
        let text = String::from_utf8_lossy(&bytes).to_string();
        self.previews.put(key, text.clone(), cache_capacity);
        Ok(text)
    }
}
