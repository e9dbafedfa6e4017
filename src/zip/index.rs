//! Load-once index of a zip archive's entries.
//!
//! Zip files are read from the end: find the End of Central Directory at the
//! tail (searching past a trailing comment when present), follow the ZIP64
//! locator chain for large archives, then parse the whole central directory
//! in one positioned read. Entry data is only touched later, per entry, when
//! a preview or extraction asks for it.

use byteorder::{LittleEndian, ReadBytesExt};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

use anyhow::{Result, bail};
use flate2::read::DeflateDecoder;

use super::format::*;
use crate::error::ExtractError;
use crate::io::{LocalArchiveReader, RangeRead};

/// Maximum zip comment size allowed by the format, which bounds the EOCD
/// search window.
const MAX_COMMENT_SIZE: u64 = 65535;

/// Parsed central directory of one archive: the flat entry list in storage
/// order plus an exact-match lookup map.
///
/// The index holds its reader so entries can be decoded later without
/// reopening the file. It never caches decoded bytes itself.
pub struct ArchiveIndex {
    reader: Box<dyn RangeRead>,
    entries: Vec<ArchiveEntry>,
    by_path: HashMap<String, usize>,
}

impl std::fmt::Debug for ArchiveIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveIndex")
            .field("entries", &self.entries)
            .field("by_path", &self.by_path)
            .finish_non_exhaustive()
    }
}

impl ArchiveIndex {
    /// Open and index the archive at `path`.
    ///
    /// Unreadable files and malformed containers both surface as
    /// [`ExtractError::LoadFailure`]; no partial entry list is ever returned.
    pub async fn load(path: &Path) -> Result<Self, ExtractError> {
        let reader = LocalArchiveReader::open(path).map_err(|e| ExtractError::LoadFailure {
            reason: e.to_string(),
        })?;
        Self::from_reader(Box::new(reader)).await
    }

    /// Index an archive behind any positioned reader.
    pub async fn from_reader(reader: Box<dyn RangeRead>) -> Result<Self, ExtractError> {
        let entries = index_entries(reader.as_ref())
            .await
            .map_err(|e| ExtractError::LoadFailure {
                reason: e.to_string(),
            })?;

        let by_path = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.path.clone(), i))
            .collect();

        Ok(Self {
            reader,
            entries,
            by_path,
        })
    }

    /// All entries in archive-storage order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Exact-match lookup. No normalization happens here; callers sanitize
    /// first.
    pub fn entry(&self, internal_path: &str) -> Option<&ArchiveEntry> {
        self.by_path.get(internal_path).map(|&i| &self.entries[i])
    }

    /// Decode one entry to raw bytes.
    ///
    /// Resolves the data offset through the entry's Local File Header (its
    /// variable-length tail can differ from the central record), reads
    /// exactly the declared compressed size, inflates, and verifies the
    /// CRC-32. Every failure mode is a [`ExtractError::DecodeFailure`].
    pub async fn read_entry(&self, entry: &ArchiveEntry) -> Result<Vec<u8>, ExtractError> {
        let decode = |e: anyhow::Error| ExtractError::DecodeFailure {
            reason: e.to_string(),
        };

        let data_offset = self.entry_data_offset(entry).await.map_err(decode)?;

        let mut compressed = vec![0u8; entry.compressed_size as usize];
        self.reader
            .read_at(data_offset, &mut compressed)
            .await
            .map_err(decode)?;

        let bytes = match entry.method {
            CompressionMethod::Stored => compressed,
            CompressionMethod::Deflate => {
                let mut inflated = Vec::with_capacity(entry.uncompressed_size as usize);
                DeflateDecoder::new(compressed.as_slice())
                    .read_to_end(&mut inflated)
                    .map_err(|e| ExtractError::DecodeFailure {
                        reason: e.to_string(),
                    })?;
                inflated
            }
            CompressionMethod::Unsupported(code) => {
                return Err(ExtractError::DecodeFailure {
                    reason: format!("unsupported compression method {code}"),
                });
            }
        };

        let checksum = crc32fast::hash(&bytes);
        if checksum != entry.crc32 {
            return Err(ExtractError::DecodeFailure {
                reason: format!(
                    "crc mismatch: expected {:08x}, got {:08x}",
                    entry.crc32, checksum
                ),
            });
        }

        Ok(bytes)
    }

    /// Where the entry's compressed data begins, past the Local File Header
    /// and its variable-length filename and extra field.
    async fn entry_data_offset(&self, entry: &ArchiveEntry) -> Result<u64> {
        let mut header = vec![0u8; LOCAL_HEADER_LEN];
        self.reader.read_at(entry.header_offset, &mut header).await?;

        if &header[0..4] != LOCAL_HEADER_SIGNATURE {
            bail!("invalid local file header");
        }

        let mut cursor = Cursor::new(&header);
        cursor.set_position(26); // filename-length field
        let name_len = cursor.read_u16::<LittleEndian>()? as u64;
        let extra_len = cursor.read_u16::<LittleEndian>()? as u64;

        Ok(entry.header_offset + LOCAL_HEADER_LEN as u64 + name_len + extra_len)
    }
}

/// Read and parse the central directory into entry records.
async fn index_entries(reader: &dyn RangeRead) -> Result<Vec<ArchiveEntry>> {
    let (eocd, eocd_offset) = find_eocd(reader).await?;

    let (cd_offset, cd_size, total_entries) = if eocd.is_zip64() {
        let eocd64 = read_zip64_eocd(reader, eocd_offset).await?;
        (eocd64.cd_offset, eocd64.cd_size, eocd64.total_entries)
    } else {
        (
            eocd.cd_offset as u64,
            eocd.cd_size as u64,
            eocd.total_entries as u64,
        )
    };

    // Single positioned read for the whole central directory.
    let mut cd_data = vec![0u8; cd_size as usize];
    reader.read_at(cd_offset, &mut cd_data).await?;

    let mut entries = Vec::with_capacity(total_entries as usize);
    let mut cursor = Cursor::new(cd_data.as_slice());
    for _ in 0..total_entries {
        entries.push(ArchiveEntry::read_central_record(&mut cursor)?);
    }

    Ok(entries)
}

/// Locate the End of Central Directory record at the archive's tail.
///
/// Tries the no-comment position first, then searches backwards through the
/// maximum comment window, validating candidates against the comment-length
/// field so a stray signature inside entry data is not mistaken for the real
/// record.
async fn find_eocd(reader: &dyn RangeRead) -> Result<(EndOfCentralDirectory, u64)> {
    let size = reader.len();

    if size >= EndOfCentralDirectory::SIZE as u64 {
        let offset = size - EndOfCentralDirectory::SIZE as u64;
        let mut buf = vec![0u8; EndOfCentralDirectory::SIZE];
        reader.read_at(offset, &mut buf).await?;

        if &buf[0..4] == EndOfCentralDirectory::SIGNATURE && &buf[20..22] == b"\x00\x00" {
            return Ok((EndOfCentralDirectory::parse(&buf)?, offset));
        }
    }

    let search_size = (MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE as u64).min(size);
    let search_start = size - search_size;

    let mut buf = vec![0u8; search_size as usize];
    reader.read_at(search_start, &mut buf).await?;

    for i in (0..buf.len().saturating_sub(EndOfCentralDirectory::SIZE)).rev() {
        if &buf[i..i + 4] == EndOfCentralDirectory::SIGNATURE {
            let comment_len = u16::from_le_bytes([buf[i + 20], buf[i + 21]]) as usize;
            if comment_len == buf.len() - i - EndOfCentralDirectory::SIZE {
                let eocd = EndOfCentralDirectory::parse(&buf[i..i + EndOfCentralDirectory::SIZE])?;
                return Ok((eocd, search_start + i as u64));
            }
        }
    }

    bail!("not a valid zip archive")
}

/// Follow the ZIP64 locator (immediately before the classic EOCD) to the
/// ZIP64 End of Central Directory.
async fn read_zip64_eocd(
    reader: &dyn RangeRead,
    eocd_offset: u64,
) -> Result<Zip64EndOfCentralDirectory> {
    let locator_offset = eocd_offset
        .checked_sub(Zip64Locator::SIZE as u64)
        .ok_or_else(|| anyhow::anyhow!("missing ZIP64 locator"))?;
    let mut locator_buf = vec![0u8; Zip64Locator::SIZE];
    reader.read_at(locator_offset, &mut locator_buf).await?;
    let locator = Zip64Locator::parse(&locator_buf)?;

    let mut eocd64_buf = vec![0u8; Zip64EndOfCentralDirectory::MIN_SIZE];
    reader.read_at(locator.eocd64_offset, &mut eocd64_buf).await?;
    Zip64EndOfCentralDirectory::parse(&eocd64_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn garbage_bytes_are_a_load_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"this is not a zip archive at all, not even close")
            .unwrap();

        let err = ArchiveIndex::load(file.path()).await.unwrap_err();
        assert!(matches!(err, ExtractError::LoadFailure { .. }));
    }

    #[tokio::test]
    async fn missing_file_is_a_load_failure() {
        let err = ArchiveIndex::load(Path::new("/no/such/archive.zip"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::LoadFailure { .. }));
    }
}
