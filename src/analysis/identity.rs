// src/analysis/identity.rs

//! Staged comparison of an incoming package against the installed copy
//!
//! Answers one question: is the user about to reinstall exactly what is
//! already on the device? The comparison is a cost ladder. Metadata is
//! free, existence checks and sizes are cheap I/O, full hashing is
//! expensive, and each stage runs only when the previous one could not
//! decide. A size mismatch in particular settles the question without
//! reading a single payload byte.

use crate::hash;
use crate::model::{BaseEntity, ContainerKind, DataSource, InstalledInfo};
use serde::Serialize;
use std::cmp::Ordering;
use std::path::Path;
use strum_macros::Display;
use tracing::debug;

/// Outcome of the identity comparison
///
/// A value, not an error: the presentation layer always receives a total
/// answer, and `Error` simply means the question could not be settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IdentityStatus {
    /// Byte-identical to the installed copy
    Identical,
    /// Same release, different bytes
    Different,
    /// The comparison does not apply to this session
    NotApplicable,
    /// Filesystem state prevented a definitive answer
    Error,
}

/// How the incoming signing certificate relates to the installed one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SignatureMatch {
    Match,
    Mismatch,
    NotInstalled,
    /// Either digest is missing or blank
    Unknown,
}

/// Version relation of the incoming package to the installed record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VersionTransition {
    FreshInstall,
    Upgrade,
    Downgrade,
    SameVersion,
}

/// Compare an incoming base against the installed copy, cheapest check first
///
/// Stages, each reached only when the previous could not decide:
/// 1. only plain single-APK sessions qualify, anything else is
///    `NotApplicable`
/// 2. either side missing is `NotApplicable`
/// 3. differing version code or name means a different release, so
///    "identical" is meaningless and the answer is `NotApplicable`
/// 4. an unusable installed source path (absent, missing on disk, or not a
///    regular file) is `Error`
/// 5. the incoming entity must be a whole local file; archive entries and
///    streams cannot be byte-compared and yield `Error`
/// 6. a size mismatch is `Different` without hashing anything
/// 7. otherwise both files are hashed concurrently and compared
pub async fn compare_identity(
    base: Option<&BaseEntity>,
    installed: Option<&InstalledInfo>,
    session_kind: ContainerKind,
) -> IdentityStatus {
    if session_kind != ContainerKind::Apk {
        return IdentityStatus::NotApplicable;
    }
    let (Some(base), Some(installed)) = (base, installed) else {
        return IdentityStatus::NotApplicable;
    };
    if base.version_code != installed.version_code
        || base.version_name != installed.version_name
    {
        return IdentityStatus::NotApplicable;
    }

    let Some(installed_path) = installed.source_path.as_deref() else {
        return IdentityStatus::Error;
    };
    let installed_meta = match tokio::fs::metadata(installed_path).await {
        Ok(meta) if meta.is_file() => meta,
        _ => return IdentityStatus::Error,
    };

    let DataSource::File {
        path: incoming_path,
    } = &base.data
    else {
        return IdentityStatus::Error;
    };
    let incoming_meta = match tokio::fs::metadata(incoming_path).await {
        Ok(meta) => meta,
        Err(_) => return IdentityStatus::Error,
    };

    if incoming_meta.len() != installed_meta.len() {
        return IdentityStatus::Different;
    }

    let (incoming_digest, installed_digest) = tokio::join!(
        content_hash(incoming_path),
        content_hash(installed_path)
    );
    match (incoming_digest, installed_digest) {
        (Some(a), Some(b)) if a == b => IdentityStatus::Identical,
        (Some(_), Some(_)) => IdentityStatus::Different,
        _ => IdentityStatus::Error,
    }
}

async fn content_hash(path: &Path) -> Option<String> {
    #[cfg(test)]
    tests::record_hashed_path(path);

    match hash::sha256_file(path).await {
        Ok(digest) => Some(digest),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "hash failed during identity comparison");
            None
        }
    }
}

/// Relate the incoming signing digest to the installed one
///
/// Blank digests are as good as missing; the answer is `Unknown` rather
/// than a false mismatch.
pub fn signature_match(
    base: Option<&BaseEntity>,
    installed: Option<&InstalledInfo>,
) -> SignatureMatch {
    let Some(installed) = installed else {
        return SignatureMatch::NotInstalled;
    };
    let incoming = base
        .and_then(|b| b.signature_digest.as_deref())
        .filter(|s| !s.trim().is_empty());
    let current = installed
        .signature_digest
        .as_deref()
        .filter(|s| !s.trim().is_empty());

    match (incoming, current) {
        (Some(a), Some(b)) if a == b => SignatureMatch::Match,
        (Some(_), Some(_)) => SignatureMatch::Mismatch,
        _ => SignatureMatch::Unknown,
    }
}

/// Version relation of an incoming version code to the installed record
pub fn version_transition(
    incoming_version_code: i64,
    installed: Option<&InstalledInfo>,
) -> VersionTransition {
    let Some(installed) = installed else {
        return VersionTransition::FreshInstall;
    };
    match incoming_version_code.cmp(&installed.version_code) {
        Ordering::Greater => VersionTransition::Upgrade,
        Ordering::Less => VersionTransition::Downgrade,
        Ordering::Equal => VersionTransition::SameVersion,
    }
}

/// Whether the device SDK satisfies the package's declared minimum
pub fn sdk_compatible(base: &BaseEntity, device_sdk: u32) -> bool {
    base.min_sdk.map_or(true, |min| min <= device_sdk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::{LazyLock, Mutex};

    /// Paths that went through full content hashing, for asserting which
    /// comparison stages actually performed expensive I/O.
    static HASHED_PATHS: LazyLock<Mutex<Vec<PathBuf>>> =
        LazyLock::new(|| Mutex::new(Vec::new()));

    pub(super) fn record_hashed_path(path: &Path) {
        HASHED_PATHS
            .lock()
            .expect("hash path log poisoned")
            .push(path.to_path_buf());
    }

    fn was_hashed(path: &Path) -> bool {
        HASHED_PATHS
            .lock()
            .expect("hash path log poisoned")
            .iter()
            .any(|p| p == path)
    }

    fn base_at(path: &Path, version_code: i64, version_name: &str) -> BaseEntity {
        BaseEntity {
            package_name: "com.example.app".to_string(),
            version_code,
            version_name: version_name.to_string(),
            declared_size: 0,
            data: DataSource::File {
                path: path.to_path_buf(),
            },
            container: ContainerKind::Apk,
            signature_digest: None,
            min_sdk: None,
            target_sdk: None,
        }
    }

    fn installed_at(path: Option<&Path>, version_code: i64, version_name: &str) -> InstalledInfo {
        InstalledInfo {
            package_name: "com.example.app".to_string(),
            version_code,
            version_name: version_name.to_string(),
            signature_digest: None,
            source_path: path.map(Path::to_path_buf),
            archived: false,
            data_kept: false,
        }
    }

    #[tokio::test]
    async fn test_non_apk_session_not_applicable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.apk");
        std::fs::write(&path, b"x").unwrap();

        let base = base_at(&path, 1, "1.0");
        let installed = installed_at(Some(&path), 1, "1.0");

        let status =
            compare_identity(Some(&base), Some(&installed), ContainerKind::SplitBundle).await;
        assert_eq!(status, IdentityStatus::NotApplicable);
    }

    #[tokio::test]
    async fn test_missing_side_not_applicable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.apk");
        std::fs::write(&path, b"x").unwrap();
        let base = base_at(&path, 1, "1.0");
        let installed = installed_at(Some(&path), 1, "1.0");

        assert_eq!(
            compare_identity(None, Some(&installed), ContainerKind::Apk).await,
            IdentityStatus::NotApplicable
        );
        assert_eq!(
            compare_identity(Some(&base), None, ContainerKind::Apk).await,
            IdentityStatus::NotApplicable
        );
    }

    #[tokio::test]
    async fn test_version_difference_not_applicable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.apk");
        std::fs::write(&path, b"x").unwrap();

        let base = base_at(&path, 2, "2.0");
        let installed = installed_at(Some(&path), 1, "1.0");

        let status = compare_identity(Some(&base), Some(&installed), ContainerKind::Apk).await;
        assert_eq!(status, IdentityStatus::NotApplicable);
    }

    #[tokio::test]
    async fn test_missing_installed_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.apk");
        std::fs::write(&path, b"x").unwrap();

        let base = base_at(&path, 1, "1.0");

        // No recorded path at all
        let installed = installed_at(None, 1, "1.0");
        assert_eq!(
            compare_identity(Some(&base), Some(&installed), ContainerKind::Apk).await,
            IdentityStatus::Error
        );

        // Recorded path no longer on disk
        let stale = installed_at(Some(&dir.path().join("gone.apk")), 1, "1.0");
        assert_eq!(
            compare_identity(Some(&base), Some(&stale), ContainerKind::Apk).await,
            IdentityStatus::Error
        );

        // Recorded path is a directory, not a regular file
        let dir_path = installed_at(Some(dir.path()), 1, "1.0");
        assert_eq!(
            compare_identity(Some(&base), Some(&dir_path), ContainerKind::Apk).await,
            IdentityStatus::Error
        );
    }

    #[tokio::test]
    async fn test_archive_entry_base_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let installed_file = dir.path().join("installed.apk");
        std::fs::write(&installed_file, b"x").unwrap();

        let mut base = base_at(&installed_file, 1, "1.0");
        base.data = DataSource::ArchiveEntry {
            archive: dir.path().join("bundle.zip"),
            name: "base.apk".to_string(),
        };
        let installed = installed_at(Some(&installed_file), 1, "1.0");

        let status = compare_identity(Some(&base), Some(&installed), ContainerKind::Apk).await;
        assert_eq!(status, IdentityStatus::Error);
    }

    #[tokio::test]
    async fn test_missing_incoming_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let installed_file = dir.path().join("installed.apk");
        std::fs::write(&installed_file, b"x").unwrap();

        let base = base_at(&dir.path().join("vanished.apk"), 1, "1.0");
        let installed = installed_at(Some(&installed_file), 1, "1.0");

        let status = compare_identity(Some(&base), Some(&installed), ContainerKind::Apk).await;
        assert_eq!(status, IdentityStatus::Error);
    }

    #[tokio::test]
    async fn test_size_mismatch_is_different_without_hashing() {
        let dir = tempfile::tempdir().unwrap();
        let incoming = dir.path().join("incoming-size-check.apk");
        let current = dir.path().join("installed-size-check.apk");
        std::fs::write(&incoming, b"longer content here").unwrap();
        std::fs::write(&current, b"short").unwrap();

        let base = base_at(&incoming, 1, "1.0");
        let installed = installed_at(Some(&current), 1, "1.0");

        let status = compare_identity(Some(&base), Some(&installed), ContainerKind::Apk).await;
        assert_eq!(status, IdentityStatus::Different);
        // The size stage settled it; neither file may have been hashed
        assert!(!was_hashed(&incoming));
        assert!(!was_hashed(&current));
    }

    #[tokio::test]
    async fn test_identical_content_hashes_both_sides() {
        let dir = tempfile::tempdir().unwrap();
        let incoming = dir.path().join("incoming-identical.apk");
        let current = dir.path().join("installed-identical.apk");
        std::fs::write(&incoming, b"exactly the same bytes").unwrap();
        std::fs::write(&current, b"exactly the same bytes").unwrap();

        let base = base_at(&incoming, 1, "1.0");
        let installed = installed_at(Some(&current), 1, "1.0");

        let status = compare_identity(Some(&base), Some(&installed), ContainerKind::Apk).await;
        assert_eq!(status, IdentityStatus::Identical);
        assert!(was_hashed(&incoming));
        assert!(was_hashed(&current));
    }

    #[tokio::test]
    async fn test_same_size_different_content() {
        let dir = tempfile::tempdir().unwrap();
        let incoming = dir.path().join("incoming-diff.apk");
        let current = dir.path().join("installed-diff.apk");
        // Same length, one byte differs
        std::fs::write(&incoming, b"payload-A").unwrap();
        std::fs::write(&current, b"payload-B").unwrap();

        let base = base_at(&incoming, 1, "1.0");
        let installed = installed_at(Some(&current), 1, "1.0");

        let status = compare_identity(Some(&base), Some(&installed), ContainerKind::Apk).await;
        assert_eq!(status, IdentityStatus::Different);
    }

    #[test]
    fn test_signature_match_table() {
        let dir = std::env::temp_dir();
        let mut base = base_at(&dir.join("a.apk"), 1, "1.0");
        let mut installed = installed_at(None, 1, "1.0");

        // Not installed at all
        assert_eq!(
            signature_match(Some(&base), None),
            SignatureMatch::NotInstalled
        );

        // Blank or missing digests are unknown, not mismatched
        assert_eq!(
            signature_match(Some(&base), Some(&installed)),
            SignatureMatch::Unknown
        );
        base.signature_digest = Some("aabbcc".to_string());
        installed.signature_digest = Some("   ".to_string());
        assert_eq!(
            signature_match(Some(&base), Some(&installed)),
            SignatureMatch::Unknown
        );
        assert_eq!(
            signature_match(None, Some(&installed)),
            SignatureMatch::Unknown
        );

        installed.signature_digest = Some("aabbcc".to_string());
        assert_eq!(
            signature_match(Some(&base), Some(&installed)),
            SignatureMatch::Match
        );

        installed.signature_digest = Some("ddeeff".to_string());
        assert_eq!(
            signature_match(Some(&base), Some(&installed)),
            SignatureMatch::Mismatch
        );
    }

    #[test]
    fn test_version_transition() {
        let installed = installed_at(None, 10, "10.0");

        assert_eq!(version_transition(11, None), VersionTransition::FreshInstall);
        assert_eq!(
            version_transition(11, Some(&installed)),
            VersionTransition::Upgrade
        );
        assert_eq!(
            version_transition(9, Some(&installed)),
            VersionTransition::Downgrade
        );
        assert_eq!(
            version_transition(10, Some(&installed)),
            VersionTransition::SameVersion
        );
    }

    #[test]
    fn test_sdk_compatible() {
        let dir = std::env::temp_dir();
        let mut base = base_at(&dir.join("a.apk"), 1, "1.0");

        // No declared minimum accepts anything
        assert!(sdk_compatible(&base, 21));

        base.min_sdk = Some(26);
        assert!(!sdk_compatible(&base, 24));
        assert!(sdk_compatible(&base, 26));
        assert!(sdk_compatible(&base, 34));
    }
}
