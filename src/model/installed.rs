// src/model/installed.rs

//! Installed-state records and the resolver seam
//!
//! The analysis pipeline never talks to a platform package manager
//! directly. It asks an [`InstalledStateResolver`] for the current record of
//! a package, which keeps the pipeline runnable against fixtures and lets a
//! real backend plug in behind the same trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Current platform record for one installed package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledInfo {
    pub package_name: String,
    pub version_code: i64,
    pub version_name: String,
    /// Hex digest of the installed signing certificate, when known
    #[serde(default)]
    pub signature_digest: Option<String>,
    /// Path of the installed base APK, absent for archived packages
    #[serde(default)]
    pub source_path: Option<PathBuf>,
    /// Package is archived: uninstalled with its icon and data retained
    #[serde(default)]
    pub archived: bool,
    /// A previous uninstall kept the data directories around
    #[serde(default)]
    pub data_kept: bool,
}

/// Source of installed-state records
#[async_trait]
pub trait InstalledStateResolver: Send + Sync {
    /// Current record for `package_name`, or `None` when not installed
    async fn lookup(&self, package_name: &str) -> Option<InstalledInfo>;
}

/// Resolver backed by a fixed in-memory snapshot
///
/// Used by tests and the CLI, which load the device state from a JSON
/// fixture instead of querying a live system.
#[derive(Debug, Default)]
pub struct SnapshotResolver {
    records: HashMap<String, InstalledInfo>,
}

impl SnapshotResolver {
    /// Resolver that reports nothing as installed
    pub fn empty() -> Self {
        SnapshotResolver::default()
    }

    pub fn new(records: impl IntoIterator<Item = InstalledInfo>) -> Self {
        SnapshotResolver {
            records: records
                .into_iter()
                .map(|info| (info.package_name.clone(), info))
                .collect(),
        }
    }

    /// Parse a snapshot from a JSON array of installed records
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<InstalledInfo> = serde_json::from_str(json)
            .map_err(|e| Error::Parse(format!("installed snapshot: {}", e)))?;
        Ok(SnapshotResolver::new(records))
    }
}

#[async_trait]
impl InstalledStateResolver for SnapshotResolver {
    async fn lookup(&self, package_name: &str) -> Option<InstalledInfo> {
        self.records.get(package_name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(package: &str, version_code: i64) -> InstalledInfo {
        InstalledInfo {
            package_name: package.to_string(),
            version_code,
            version_name: format!("{}.0", version_code),
            signature_digest: None,
            source_path: None,
            archived: false,
            data_kept: false,
        }
    }

    #[tokio::test]
    async fn test_snapshot_lookup() {
        let resolver = SnapshotResolver::new([record("com.example.app", 3)]);

        let hit = resolver.lookup("com.example.app").await;
        assert_eq!(hit.map(|i| i.version_code), Some(3));

        let miss = resolver.lookup("com.example.other").await;
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_empty_resolver() {
        let resolver = SnapshotResolver::empty();
        assert!(resolver.lookup("anything").await.is_none());
    }

    #[test]
    fn test_snapshot_from_json() {
        let json = r#"[
            {"package_name": "com.example.app", "version_code": 5, "version_name": "5.0"},
            {"package_name": "com.example.game", "version_code": 12, "version_name": "1.2",
             "source_path": "/data/app/com.example.game/base.apk", "archived": false}
        ]"#;

        let resolver = SnapshotResolver::from_json(json).unwrap();
        assert_eq!(resolver.records.len(), 2);
        assert_eq!(
            resolver.records["com.example.game"].source_path,
            Some(PathBuf::from("/data/app/com.example.game/base.apk"))
        );
    }

    #[test]
    fn test_snapshot_bad_json() {
        let result = SnapshotResolver::from_json("{not json");
        assert!(matches!(result, Err(Error::Parse(_))));
    }
}
