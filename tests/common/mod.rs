//! In-memory zip fixture builder for integration tests.
//!
//! Writes real Local File Header / Central Directory / EOCD records so the
//! tests exercise the same parsing path as production archives, including
//! entries whose declared sizes lie (for safety-gate tests) and archives
//! with trailing comments (for the EOCD search path).
//!
//! Shared by multiple test binaries; not every binary uses every builder.
#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::Write;
use std::path::Path;

struct FixtureEntry {
    path: String,
    /// Bytes stored in the archive (already compressed for deflate).
    data: Vec<u8>,
    method: u16,
    crc32: u32,
    compressed_size: u32,
    uncompressed_size: u32,
}

#[derive(Default)]
pub struct ZipFixture {
    entries: Vec<FixtureEntry>,
    comment: Vec<u8>,
}

impl ZipFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// An uncompressed file entry.
    pub fn stored(mut self, path: &str, data: &[u8]) -> Self {
        self.entries.push(FixtureEntry {
            path: path.to_string(),
            data: data.to_vec(),
            method: 0,
            crc32: crc32fast::hash(data),
            compressed_size: data.len() as u32,
            uncompressed_size: data.len() as u32,
        });
        self
    }

    /// A deflate-compressed file entry.
    pub fn deflated(mut self, path: &str, data: &[u8]) -> Self {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        let compressed = encoder.finish().unwrap();
        self.entries.push(FixtureEntry {
            path: path.to_string(),
            compressed_size: compressed.len() as u32,
            uncompressed_size: data.len() as u32,
            crc32: crc32fast::hash(data),
            data: compressed,
            method: 8,
        });
        self
    }

    /// An explicit directory entry (trailing slash, no data).
    pub fn dir(mut self, path: &str) -> Self {
        let path = if path.ends_with('/') {
            path.to_string()
        } else {
            format!("{path}/")
        };
        self.entries.push(FixtureEntry {
            path,
            data: Vec::new(),
            method: 0,
            crc32: 0,
            compressed_size: 0,
            uncompressed_size: 0,
        });
        self
    }

    /// A stored entry whose central-directory sizes are whatever the test
    /// declares, regardless of the actual data. Used to trip the safety
    /// gate.
    pub fn declared(
        mut self,
        path: &str,
        data: &[u8],
        compressed_size: u32,
        uncompressed_size: u32,
    ) -> Self {
        self.entries.push(FixtureEntry {
            path: path.to_string(),
            data: data.to_vec(),
            method: 0,
            crc32: crc32fast::hash(data),
            compressed_size,
            uncompressed_size,
        });
        self
    }

    /// A stored entry with a deliberately wrong CRC.
    pub fn corrupt(mut self, path: &str, data: &[u8]) -> Self {
        self.entries.push(FixtureEntry {
            path: path.to_string(),
            data: data.to_vec(),
            method: 0,
            crc32: crc32fast::hash(data) ^ 0xDEADBEEF,
            compressed_size: data.len() as u32,
            uncompressed_size: data.len() as u32,
        });
        self
    }

    /// A trailing archive comment, pushing the EOCD away from the file end.
    pub fn comment(mut self, text: &str) -> Self {
        self.comment = text.as_bytes().to_vec();
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut offsets = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            offsets.push(out.len() as u32);
            out.extend_from_slice(b"PK\x03\x04");
            out.write_u16::<LittleEndian>(20).unwrap(); // version needed
            out.write_u16::<LittleEndian>(0).unwrap(); // flags
            out.write_u16::<LittleEndian>(entry.method).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap(); // mod time
            out.write_u16::<LittleEndian>(0).unwrap(); // mod date
            out.write_u32::<LittleEndian>(entry.crc32).unwrap();
            out.write_u32::<LittleEndian>(entry.compressed_size).unwrap();
            out.write_u32::<LittleEndian>(entry.uncompressed_size)
                .unwrap();
            out.write_u16::<LittleEndian>(entry.path.len() as u16)
                .unwrap();
            out.write_u16::<LittleEndian>(0).unwrap(); // extra len
            out.extend_from_slice(entry.path.as_bytes());
            out.extend_from_slice(&entry.data);
        }

        let cd_offset = out.len() as u32;
        for (entry, offset) in self.entries.iter().zip(&offsets) {
            out.extend_from_slice(b"PK\x01\x02");
            out.write_u16::<LittleEndian>(20).unwrap(); // version made by
            out.write_u16::<LittleEndian>(20).unwrap(); // version needed
            out.write_u16::<LittleEndian>(0).unwrap(); // flags
            out.write_u16::<LittleEndian>(entry.method).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap(); // mod time
            out.write_u16::<LittleEndian>(0).unwrap(); // mod date
            out.write_u32::<LittleEndian>(entry.crc32).unwrap();
            out.write_u32::<LittleEndian>(entry.compressed_size).unwrap();
            out.write_u32::<LittleEndian>(entry.uncompressed_size)
                .unwrap();
            out.write_u16::<LittleEndian>(entry.path.len() as u16)
                .unwrap();
            out.write_u16::<LittleEndian>(0).unwrap(); // extra len
            out.write_u16::<LittleEndian>(0).unwrap(); // comment len
            out.write_u16::<LittleEndian>(0).unwrap(); // disk start
            out.write_u16::<LittleEndian>(0).unwrap(); // internal attrs
            out.write_u32::<LittleEndian>(0).unwrap(); // external attrs
            out.write_u32::<LittleEndian>(*offset).unwrap();
            out.extend_from_slice(entry.path.as_bytes());
        }
        let cd_size = out.len() as u32 - cd_offset;

        out.extend_from_slice(b"PK\x05\x06");
        out.write_u16::<LittleEndian>(0).unwrap(); // disk number
        out.write_u16::<LittleEndian>(0).unwrap(); // disk with cd
        out.write_u16::<LittleEndian>(self.entries.len() as u16)
            .unwrap();
        out.write_u16::<LittleEndian>(self.entries.len() as u16)
            .unwrap();
        out.write_u32::<LittleEndian>(cd_size).unwrap();
        out.write_u32::<LittleEndian>(cd_offset).unwrap();
        out.write_u16::<LittleEndian>(self.comment.len() as u16)
            .unwrap();
        out.extend_from_slice(&self.comment);

        out
    }

    pub fn write_to(&self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }
}
