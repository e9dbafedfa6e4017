use super::RangeRead;
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// Positioned reader over an archive file on the local filesystem.
pub struct LocalArchiveReader {
    file: std::fs::File,
    size: u64,
    #[cfg(not(unix))]
    seek_lock: std::sync::Mutex<()>,
}

impl LocalArchiveReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            file,
            size,
            #[cfg(not(unix))]
            seek_lock: std::sync::Mutex::new(()),
        })
    }
}

#[async_trait]
impl RangeRead for LocalArchiveReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            Ok(self.file.read_at(buf, offset)?)
        }

        #[cfg(not(unix))]
        {
            use std::io::{Read, Seek, SeekFrom};
            // No pread outside unix; serialize seek+read pairs instead.
            let _guard = self.seek_lock.lock().unwrap_or_else(|e| e.into_inner());
            let mut file = &self.file;
            file.seek(SeekFrom::Start(offset))?;
            Ok(file.read(buf)?)
        }
    }

    fn len(&self) -> u64 {
        self.size
    }
}
