//! Zip container reading: format records and the load-once entry index.
//!
//! The archive is the flat source of truth. This module parses the End of
//! Central Directory (with ZIP64 support) and the central directory into
//! [`format::ArchiveEntry`] records, and decodes individual entries on
//! demand. Hierarchy is somebody else's job: see [`crate::vfs::tree`].
//!
//! Supported: standard and ZIP64 containers, STORED and DEFLATE entries.
//! Not supported: encryption, multi-disk archives, other compression
//! methods.

mod format;
mod index;

pub use format::{ArchiveEntry, CompressionMethod};
pub use index::ArchiveIndex;
