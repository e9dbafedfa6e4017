//! Binary layout of the zip container structures we read.
//!
//! Only the records needed to index and decode entries are modeled: the End
//! of Central Directory (plus its ZIP64 variants) and the central directory
//! file header. Local file headers are touched just enough to find where an
//! entry's data starts.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use anyhow::{Result, bail};

/// Central Directory File Header signature (PK\x01\x02).
pub const CENTRAL_RECORD_SIGNATURE: &[u8] = b"PK\x01\x02";

/// Local File Header signature (PK\x03\x04).
pub const LOCAL_HEADER_SIGNATURE: &[u8] = b"PK\x03\x04";

/// Fixed size of a Local File Header, before its variable-length tail.
pub const LOCAL_HEADER_LEN: usize = 30;

/// How an entry's bytes are stored inside the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unsupported(u16),
}

impl CompressionMethod {
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unsupported(code),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unsupported(code) => *code,
        }
    }
}

/// One record per path stored in the archive, as read from the central
/// directory. Immutable once the archive is indexed; the entry set is the
/// source of truth for every tree operation.
///
/// Sizes are first-class fields here: the safety gate reads them before any
/// entry data is decoded, so they must never require digging into decoder
/// internals.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Forward-slash separated, as stored in the archive.
    pub path: String,
    /// Explicit directory marker (`path` ends with `/`). Directories implied
    /// only by nested file paths have no entry of their own.
    pub is_directory: bool,
    pub method: CompressionMethod,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub crc32: u32,
    /// Offset of this entry's Local File Header.
    pub header_offset: u64,
}

impl ArchiveEntry {
    /// Parse one central directory record, leaving the cursor at the start
    /// of the next one.
    pub fn read_central_record(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let mut sig = [0u8; 4];
        cursor.read_exact(&mut sig)?;
        if sig != CENTRAL_RECORD_SIGNATURE {
            bail!("invalid central directory record");
        }

        let _version_made_by = cursor.read_u16::<LittleEndian>()?;
        let _version_needed = cursor.read_u16::<LittleEndian>()?;
        let _flags = cursor.read_u16::<LittleEndian>()?;
        let method = cursor.read_u16::<LittleEndian>()?;
        let _mod_time = cursor.read_u16::<LittleEndian>()?;
        let _mod_date = cursor.read_u16::<LittleEndian>()?;
        let crc32 = cursor.read_u32::<LittleEndian>()?;
        let mut compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
        let mut uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
        let name_len = cursor.read_u16::<LittleEndian>()?;
        let extra_len = cursor.read_u16::<LittleEndian>()?;
        let comment_len = cursor.read_u16::<LittleEndian>()?;
        let _disk_start = cursor.read_u16::<LittleEndian>()?;
        let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
        let _external_attrs = cursor.read_u32::<LittleEndian>()?;
        let mut header_offset = cursor.read_u32::<LittleEndian>()? as u64;

        let mut name_bytes = vec![0u8; name_len as usize];
        cursor.read_exact(&mut name_bytes)?;
        // Lossy so archives with non-UTF8 names still index.
        let path = String::from_utf8_lossy(&name_bytes).to_string();
        let is_directory = path.ends_with('/');

        // ZIP64 extended information lives in extra field 0x0001; each wide
        // field is present only when the narrow one is saturated.
        let extra_end = cursor.position() + extra_len as u64;
        while cursor.position() + 4 <= extra_end {
            let field_id = cursor.read_u16::<LittleEndian>()?;
            let field_size = cursor.read_u16::<LittleEndian>()?;
            if field_id == 0x0001 {
                if uncompressed_size == 0xFFFFFFFF && cursor.position() + 8 <= extra_end {
                    uncompressed_size = cursor.read_u64::<LittleEndian>()?;
                }
                if compressed_size == 0xFFFFFFFF && cursor.position() + 8 <= extra_end {
                    compressed_size = cursor.read_u64::<LittleEndian>()?;
                }
                if header_offset == 0xFFFFFFFF && cursor.position() + 8 <= extra_end {
                    header_offset = cursor.read_u64::<LittleEndian>()?;
                }
                break;
            }
            cursor.set_position(cursor.position() + field_size as u64);
        }
        cursor.set_position(extra_end + comment_len as u64);

        Ok(ArchiveEntry {
            path,
            is_directory,
            method: CompressionMethod::from_code(method),
            compressed_size,
            uncompressed_size,
            crc32,
            header_offset,
        })
    }
}

/// End of Central Directory record - 22 bytes minimum.
pub struct EndOfCentralDirectory {
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            bail!("invalid end of central directory");
        }

        let mut cursor = Cursor::new(&data[4..]);
        let _disk_number = cursor.read_u16::<LittleEndian>()?;
        let _disk_with_cd = cursor.read_u16::<LittleEndian>()?;

        Ok(Self {
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
        })
    }

    /// Any saturated field means the real values live in the ZIP64 EOCD.
    pub fn is_zip64(&self) -> bool {
        self.disk_entries == 0xFFFF
            || self.total_entries == 0xFFFF
            || self.cd_size == 0xFFFFFFFF
            || self.cd_offset == 0xFFFFFFFF
    }
}

/// ZIP64 End of Central Directory Locator - 20 bytes.
pub struct Zip64Locator {
    pub eocd64_offset: u64,
}

impl Zip64Locator {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x07";
    pub const SIZE: usize = 20;

    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            bail!("invalid ZIP64 locator");
        }

        let mut cursor = Cursor::new(&data[4..]);
        let _disk_with_eocd64 = cursor.read_u32::<LittleEndian>()?;

        Ok(Self {
            eocd64_offset: cursor.read_u64::<LittleEndian>()?,
        })
    }
}

/// ZIP64 End of Central Directory - 56 bytes minimum.
pub struct Zip64EndOfCentralDirectory {
    pub total_entries: u64,
    pub cd_size: u64,
    pub cd_offset: u64,
}

impl Zip64EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x06";
    pub const MIN_SIZE: usize = 56;

    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::MIN_SIZE || &data[0..4] != Self::SIGNATURE {
            bail!("invalid ZIP64 end of central directory");
        }

        let mut cursor = Cursor::new(&data[4..]);
        let _record_size = cursor.read_u64::<LittleEndian>()?;
        let _version_made_by = cursor.read_u16::<LittleEndian>()?;
        let _version_needed = cursor.read_u16::<LittleEndian>()?;
        let _disk_number = cursor.read_u32::<LittleEndian>()?;
        let _disk_with_cd = cursor.read_u32::<LittleEndian>()?;
        let _disk_entries = cursor.read_u64::<LittleEndian>()?;

        Ok(Self {
            total_entries: cursor.read_u64::<LittleEndian>()?,
            cd_size: cursor.read_u64::<LittleEndian>()?,
            cd_offset: cursor.read_u64::<LittleEndian>()?,
        })
    }
}
