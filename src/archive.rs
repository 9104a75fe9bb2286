// src/archive.rs

//! Zip container access for fingerprinting and format sniffing
//!
//! Entry metadata comes straight from the central directory: the stored
//! CRC-32 and uncompressed size are enough to tell two archive members
//! apart, and reading them never decompresses payload bytes. That keeps
//! fingerprinting a multi-gigabyte bundle at a few directory reads.

use crate::error::{Error, Result};
use std::io::Read;
use std::path::Path;

/// Central-directory metadata for one archive entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStat {
    /// CRC-32 of the uncompressed entry content, as recorded by the archiver
    pub crc32: u32,
    /// Uncompressed entry size in bytes
    pub size: u64,
}

/// Whether a byte prefix carries a zip magic number
///
/// Accepts the regular local-file-header magic as well as the empty-archive
/// and spanned-archive markers. Anything shorter than four bytes is not a
/// zip file.
pub fn is_zip_magic(prefix: &[u8]) -> bool {
    // PK\x03\x04 local file, PK\x05\x06 empty archive, PK\x07\x08 spanned
    matches!(
        prefix,
        [0x50, 0x4B, 0x03, 0x04, ..] | [0x50, 0x4B, 0x05, 0x06, ..] | [0x50, 0x4B, 0x07, 0x08, ..]
    )
}

/// Detect a zip container from its leading magic bytes
pub fn is_zip_file(path: &Path) -> Result<bool> {
    let mut file = std::fs::File::open(path)?;
    let mut magic = [0u8; 4];
    if file.read(&mut magic)? < 4 {
        return Ok(false);
    }
    Ok(is_zip_magic(&magic))
}

/// Read the central-directory metadata of a named entry
///
/// Runs on the blocking pool; the zip reader seeks through the central
/// directory and would otherwise stall the async runtime on large archives.
pub async fn entry_stat(archive: &Path, name: &str) -> Result<EntryStat> {
    let archive = archive.to_path_buf();
    let name = name.to_string();

    let result: Result<EntryStat> = tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&archive)?;
        let mut zip = zip::ZipArchive::new(file)
            .map_err(|e| Error::Archive(format!("{}: {}", archive.display(), e)))?;
        let entry = zip
            .by_name(&name)
            .map_err(|e| Error::Archive(format!("{} in {}: {}", name, archive.display(), e)))?;
        Ok(EntryStat {
            crc32: entry.crc32(),
            size: entry.size(),
        })
    })
    .await
    .map_err(|e| Error::Archive(format!("archive task join error: {}", e)))?;

    result
}
