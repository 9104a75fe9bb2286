// src/hash.rs

//! SHA-256 content hashing for package identity
//!
//! Hashes are the strong form of content fingerprint: two packages with the
//! same digest are treated as byte-identical. Everything here returns
//! lowercase hex strings so digests can be compared and logged directly.
//!
//! File hashing streams in fixed-size chunks; packages routinely reach
//! hundreds of megabytes and must never be buffered whole.

use sha2::{Digest, Sha256};
use std::io::{self, Read};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Read buffer size for streamed hashing
const CHUNK_SIZE: usize = 8192;

/// Compute the SHA-256 digest of a byte slice as lowercase hex
pub fn sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Compute the SHA-256 digest of everything a reader yields
///
/// Streams the content to avoid loading it entirely into memory.
pub fn sha256_reader<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Compute the SHA-256 digest of a file without blocking the runtime
///
/// The identity comparison hashes the incoming and installed copies
/// concurrently, so this must be independently awaitable per file.
pub async fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let n = file.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sha256_known_vector() {
        let digest = sha256(b"Hello, World!");
        assert_eq!(
            digest,
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
        assert_eq!(digest.len(), 64); // 256 bits = 32 bytes = 64 hex chars
    }

    #[test]
    fn test_sha256_second_vector() {
        assert_eq!(
            sha256(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_sha256_reader_matches_bytes() {
        let data = b"Hello, World!";
        let mut cursor = std::io::Cursor::new(data);

        let streamed = sha256_reader(&mut cursor).unwrap();
        assert_eq!(streamed, sha256(data));
    }

    #[test]
    fn test_sha256_reader_multi_chunk() {
        // Larger than one read buffer, so the loop runs more than once
        let data = vec![0xabu8; CHUNK_SIZE * 3 + 17];
        let mut cursor = std::io::Cursor::new(data.clone());

        let streamed = sha256_reader(&mut cursor).unwrap();
        assert_eq!(streamed, sha256(&data));
    }

    #[tokio::test]
    async fn test_sha256_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.bin");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"hello world").unwrap();
        drop(file);

        let digest = sha256_file(&path).await.unwrap();
        assert_eq!(
            digest,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[tokio::test]
    async fn test_sha256_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = sha256_file(&dir.path().join("absent.bin")).await;
        assert!(result.is_err());
    }
}
