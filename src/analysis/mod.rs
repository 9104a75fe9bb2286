// src/analysis/mod.rs

//! Install-session analysis pipeline
//!
//! This is the core of the crate: raw entities from ingestion are grouped
//! per package, de-duplicated by content fingerprint, paired with the
//! platform's installed record, then classified into a session shape. A
//! separate staged comparison decides whether an incoming package is
//! byte-identical to what is already installed.
//!
//! Everything in here is value-oriented: comparisons and classifications
//! return totals (enums), not errors, so the layers above always get a
//! well-typed answer. The only fallible entry point is [`process`], which
//! rejects invalid entities at the boundary.

pub mod classify;
pub mod dedup;
pub mod fingerprint;
pub mod identity;

pub use classify::{classify_session, SessionTypeInfo};
pub use dedup::deduplicate;
pub use fingerprint::{fingerprint, Fingerprint};
pub use identity::{
    compare_identity, sdk_compatible, signature_match, version_transition, IdentityStatus,
    SignatureMatch, VersionTransition,
};

use crate::error::Result;
use crate::model::{BaseEntity, InstalledInfo, InstalledStateResolver, PackageEntity};
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// One package's deduplicated entities paired with its installed record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedGroup {
    pub package_name: String,
    pub entities: Vec<PackageEntity>,
    /// Platform record fetched once for this pass, `None` if not installed
    pub installed: Option<InstalledInfo>,
}

impl ProcessedGroup {
    /// First base entity of the group, if any
    pub fn base(&self) -> Option<&BaseEntity> {
        self.entities.iter().find_map(PackageEntity::as_base)
    }
}

/// Group raw entities per package, de-duplicate and resolve each group
///
/// Groups appear in first-encounter order of their package name, so the
/// output is stable for a given input. Per-group work (fingerprinting and
/// the installed-state lookup) runs concurrently across groups; the
/// resolver is invoked exactly once per distinct package name.
pub async fn process<R>(raw: Vec<PackageEntity>, resolver: &R) -> Result<Vec<ProcessedGroup>>
where
    R: InstalledStateResolver + ?Sized,
{
    for entity in &raw {
        entity.validate()?;
    }

    let mut groups: Vec<(String, Vec<PackageEntity>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for entity in raw {
        let key = entity.package_name().to_string();
        match index.get(&key).copied() {
            Some(i) => groups[i].1.push(entity),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![entity]));
            }
        }
    }

    let processed = join_all(groups.into_iter().map(|(name, entities)| async move {
        let (entities, installed) =
            tokio::join!(deduplicate(entities), resolver.lookup(&name));
        debug!(
            package = %name,
            entities = entities.len(),
            installed = installed.is_some(),
            "processed package group"
        );
        ProcessedGroup {
            package_name: name,
            entities,
            installed,
        }
    }))
    .await;

    Ok(processed)
}
