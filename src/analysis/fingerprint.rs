// src/analysis/fingerprint.rs

//! Content fingerprints for base packages
//!
//! A fingerprint is an opaque equality token: two bases with the same token
//! are redundant copies of the same content. The token is as strong as the
//! source allows, degrading in steps:
//!
//! - whole files hash to their SHA-256 digest
//! - archive entries use the central directory's CRC-32 plus uncompressed
//!   size, which never touches payload bytes
//! - when content access fails, identity falls back to the source name and
//!   version code rather than failing the pipeline
//!
//! Fallback tokens are weaker than content tokens. Two different files that
//! happen to share a name and version code collapse into one entity; that
//! trade-off keeps dedup total in the face of unreadable input.

use crate::archive;
use crate::hash;
use crate::model::{BaseEntity, DataSource};
use std::fmt;
use tracing::debug;

/// Opaque equality token for a base package's content
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compute the content fingerprint of a base entity
///
/// Never fails: content errors degrade to a name-based token. Hashing and
/// archive reads are awaitable per entity, so callers can fan out across a
/// whole group.
pub async fn fingerprint(base: &BaseEntity) -> Fingerprint {
    match &base.data {
        DataSource::File { path } => match hash::sha256_file(path).await {
            Ok(digest) => Fingerprint(digest),
            Err(e) => {
                debug!(
                    path = %path.display(),
                    error = %e,
                    "file unreadable, using path fallback fingerprint"
                );
                Fingerprint(format!("{}_{}", path.display(), base.version_code))
            }
        },
        DataSource::ArchiveEntry { archive, name } => {
            match archive::entry_stat(archive, name).await {
                Ok(stat) => Fingerprint(format!("{}|{}", stat.crc32, stat.size)),
                Err(e) => {
                    debug!(
                        entry = %name,
                        archive = %archive.display(),
                        error = %e,
                        "entry metadata unreadable, using name fallback fingerprint"
                    );
                    Fingerprint(format!("{}_{}", name, base.version_code))
                }
            }
        }
        DataSource::Stream { .. } => {
            Fingerprint(format!("{}_{}", base.package_name, base.version_code))
        }
    }
}
