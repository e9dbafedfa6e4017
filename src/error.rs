//! Error taxonomy for archive browsing and extraction.
//!
//! Every failure in the core is one of these kinds. All of them are
//! per-request: nothing here is fatal to the process, nothing is retried
//! automatically, and the preview boundary renders each kind into a
//! human-readable message instead of letting it escape.

use thiserror::Error;

const MB: u64 = 1024 * 1024;

/// A failure while resolving or extracting an archive entry.
///
/// `TooLarge` and `SuspiciousRatio` are deliberately distinct kinds so
/// callers (and tests) can tell "file too big" apart from "looks like a
/// zip bomb".
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The archive-internal path failed sanitization (traversal attempt,
    /// drive letter, or empty after normalization).
    #[error("invalid archive-internal path")]
    InvalidPath,

    /// The archive file could not be read or is not a valid zip container.
    #[error("cannot load archive: {reason}")]
    LoadFailure { reason: String },

    /// The sanitized path does not name any entry in the archive.
    #[error("no entry named `{path}` in archive")]
    NotFound { path: String },

    /// The entry's declared uncompressed size exceeds the configured limit.
    #[error("entry is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    /// The declared compression ratio exceeds the bomb threshold.
    #[error("compression ratio of {uncompressed}/{compressed} exceeds {limit}:1")]
    SuspiciousRatio {
        compressed: u64,
        uncompressed: u64,
        limit: u64,
    },

    /// The entry's bytes could not be decoded (corrupt data, unsupported
    /// compression method, or CRC mismatch).
    #[error("cannot decode entry: {reason}")]
    DecodeFailure { reason: String },
}

impl ExtractError {
    /// The user-facing message shown at the preview boundary.
    pub fn user_message(&self) -> String {
        match self {
            ExtractError::InvalidPath => "Invalid file path".to_string(),
            ExtractError::NotFound { .. } => "File not found".to_string(),
            ExtractError::TooLarge { size, limit } => format!(
                "File too large to preview ({:.1}mb exceeds {}mb limit)",
                *size as f64 / MB as f64,
                limit / MB,
            ),
            ExtractError::SuspiciousRatio { .. } => {
                "Suspicious compression ratio detected".to_string()
            }
            ExtractError::LoadFailure { reason } | ExtractError::DecodeFailure { reason } => {
                format!("Error reading file: {reason}")
            }
        }
    }
}
