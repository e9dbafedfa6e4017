mod local;

pub use local::LocalArchiveReader;

use anyhow::Result;
use async_trait::async_trait;

/// Random-access reads over an archive's raw bytes.
///
/// Zip archives are read from the end (EOCD, then central directory, then
/// individual entry data), so the index layer needs positioned reads rather
/// than a sequential stream.
#[async_trait]
pub trait RangeRead: Send + Sync {
    /// Read bytes at the given offset into the buffer.
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Total size of the underlying archive in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
