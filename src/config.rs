//! Configuration for preview limits and cache capacity.
//!
//! Settings come from an optional TOML file with CLI overrides on top.
//! The browser re-reads them at every extraction and cache decision, so a
//! runtime update takes effect on the next call rather than the next start.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Default maximum previewable file size in megabytes.
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 10;

/// Default maximum compression ratio before an entry is treated as a bomb.
pub const DEFAULT_MAX_COMPRESSION_RATIO: u64 = 100;

/// Default number of decoded previews kept in the content cache.
pub const DEFAULT_MAX_CACHED_PREVIEWS: usize = 50;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Settings {
    /// Largest entry (uncompressed) that may be previewed, in MB.
    pub max_file_size_mb: Option<u64>,
    /// Uncompressed/compressed ratio above which an entry is rejected.
    pub max_compression_ratio: Option<u64>,
    /// Capacity of the decoded-preview LRU cache.
    pub max_cached_previews: Option<usize>,
}

impl Settings {
    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_size_mb
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB)
            .saturating_mul(1024 * 1024)
    }

    pub fn max_compression_ratio(&self) -> u64 {
        self.max_compression_ratio
            .unwrap_or(DEFAULT_MAX_COMPRESSION_RATIO)
    }

    pub fn max_cached_previews(&self) -> usize {
        self.max_cached_previews
            .unwrap_or(DEFAULT_MAX_CACHED_PREVIEWS)
    }
}

/// Load settings from a TOML file, falling back to defaults if it is absent.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let settings: Settings =
        toml::from_str(&contents).context("Failed to parse config file as TOML")?;
    Ok(settings)
}
