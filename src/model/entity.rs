// src/model/entity.rs

//! Resolved package entities
//!
//! An entity is one installable unit after ingestion has parsed whatever the
//! user handed over: a base package, a split (feature or configuration
//! APK), or a vendor module image. Entities carry where their bytes live so
//! later stages can fingerprint and hash them without re-parsing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use strum_macros::Display;

use crate::error::{Error, Result};

/// Where an entity's bytes can be read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataSource {
    /// A standalone file on local storage
    File { path: PathBuf },
    /// A named entry inside a zip container on local storage
    ArchiveEntry { archive: PathBuf, name: String },
    /// An opaque stream with no stable storage location (e.g. piped input)
    Stream { label: String },
}

impl DataSource {
    /// The local path this source lives at, if it has one
    ///
    /// Archive entries report the containing archive: for "how many files
    /// did this session come from" purposes the container is the file.
    pub fn source_path(&self) -> Option<&Path> {
        match self {
            DataSource::File { path } => Some(path),
            DataSource::ArchiveEntry { archive, .. } => Some(archive),
            DataSource::Stream { .. } => None,
        }
    }
}

/// The container shape an entity arrived in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContainerKind {
    /// Single standalone APK
    Apk,
    /// Split bundle (APKS/XAPK style): one base plus splits
    SplitBundle,
    /// Several independent APKs handed over together
    MultiApk,
    /// A zip of independent APKs
    MultiApkZip,
    /// A zip holding vendor module images only
    ModuleZip,
    /// APKs and module images mixed, loose
    MixedModuleApk,
    /// APKs and module images mixed inside one zip
    MixedModuleZip,
}

impl ContainerKind {
    /// Whether this kind mixes vendor modules with regular packages
    pub const fn is_mixed_module(self) -> bool {
        matches!(
            self,
            ContainerKind::MixedModuleApk | ContainerKind::MixedModuleZip
        )
    }
}

/// A base package: the installable core of an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseEntity {
    pub package_name: String,
    pub version_code: i64,
    pub version_name: String,
    /// Size declared by ingestion, zero when unknown
    #[serde(default)]
    pub declared_size: u64,
    pub data: DataSource,
    pub container: ContainerKind,
    /// Hex digest of the signing certificate, when ingestion extracted one
    #[serde(default)]
    pub signature_digest: Option<String>,
    #[serde(default)]
    pub min_sdk: Option<u32>,
    #[serde(default)]
    pub target_sdk: Option<u32>,
}

/// A split APK belonging to some base package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitEntity {
    pub package_name: String,
    /// Split identifier, e.g. "config.arm64_v8a"
    pub split_name: String,
    pub version_code: i64,
    pub version_name: String,
    #[serde(default)]
    pub declared_size: u64,
    pub data: DataSource,
    pub container: ContainerKind,
}

/// A vendor module image (recovery-flashable zip member)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntity {
    pub package_name: String,
    /// Human-readable module name from its property file
    pub name: String,
    pub version_code: i64,
    pub version_name: String,
    #[serde(default)]
    pub declared_size: u64,
    pub data: DataSource,
    pub container: ContainerKind,
}

/// Any installable unit produced by ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PackageEntity {
    Base(BaseEntity),
    Split(SplitEntity),
    Module(ModuleEntity),
}

impl PackageEntity {
    pub fn package_name(&self) -> &str {
        match self {
            PackageEntity::Base(e) => &e.package_name,
            PackageEntity::Split(e) => &e.package_name,
            PackageEntity::Module(e) => &e.package_name,
        }
    }

    pub fn version_code(&self) -> i64 {
        match self {
            PackageEntity::Base(e) => e.version_code,
            PackageEntity::Split(e) => e.version_code,
            PackageEntity::Module(e) => e.version_code,
        }
    }

    pub fn version_name(&self) -> &str {
        match self {
            PackageEntity::Base(e) => &e.version_name,
            PackageEntity::Split(e) => &e.version_name,
            PackageEntity::Module(e) => &e.version_name,
        }
    }

    pub fn data(&self) -> &DataSource {
        match self {
            PackageEntity::Base(e) => &e.data,
            PackageEntity::Split(e) => &e.data,
            PackageEntity::Module(e) => &e.data,
        }
    }

    pub fn container(&self) -> ContainerKind {
        match self {
            PackageEntity::Base(e) => e.container,
            PackageEntity::Split(e) => e.container,
            PackageEntity::Module(e) => e.container,
        }
    }

    pub fn is_base(&self) -> bool {
        matches!(self, PackageEntity::Base(_))
    }

    pub fn is_module(&self) -> bool {
        matches!(self, PackageEntity::Module(_))
    }

    pub fn as_base(&self) -> Option<&BaseEntity> {
        match self {
            PackageEntity::Base(e) => Some(e),
            _ => None,
        }
    }

    /// Check the model invariants ingestion is supposed to uphold
    pub fn validate(&self) -> Result<()> {
        if self.package_name().is_empty() {
            return Err(Error::InvalidEntity(
                "entity has an empty package name".to_string(),
            ));
        }
        match self {
            PackageEntity::Split(e) if e.split_name.is_empty() => Err(Error::InvalidEntity(
                format!("split of {} has an empty split name", e.package_name),
            )),
            PackageEntity::Module(e) if e.name.is_empty() => Err(Error::InvalidEntity(format!(
                "module of {} has an empty module name",
                e.package_name
            ))),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for PackageEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageEntity::Base(e) => write!(f, "{}:{}", e.package_name, e.version_code),
            PackageEntity::Split(e) => {
                write!(f, "{}/{}:{}", e.package_name, e.split_name, e.version_code)
            }
            PackageEntity::Module(e) => {
                write!(f, "{} (module {}):{}", e.package_name, e.name, e.version_code)
            }
        }
    }
}
