// src/analysis/dedup.rs

//! Duplicate elimination within one package group
//!
//! Users routinely hand over the same APK twice (a file picked twice, a
//! re-downloaded copy under another name). Within a group, base entities
//! with the same content fingerprint are redundant; only the first-seen
//! copy survives. Splits and modules are never de-duplicated, their names
//! already make them distinct.

use crate::analysis::fingerprint::{fingerprint, Fingerprint};
use crate::model::PackageEntity;
use futures::future::join_all;
use std::collections::HashSet;
use tracing::debug;

/// Drop redundant base entities, keeping the first copy per fingerprint
///
/// With one base or none there is nothing to compare, and the input comes
/// back untouched; no fingerprint is computed, so unreadable sources cannot
/// disturb a group where dedup cannot matter anyway. Otherwise the result
/// is the retained bases (original relative order) followed by all
/// non-base entities (original relative order).
///
/// Running this on its own output is a no-op.
pub async fn deduplicate(entities: Vec<PackageEntity>) -> Vec<PackageEntity> {
    let base_count = entities.iter().filter(|e| e.is_base()).count();
    if base_count <= 1 {
        return entities;
    }

    // Partition keeps relative order on both sides, so first-seen-wins is
    // judged against the original input order.
    let (bases, rest): (Vec<PackageEntity>, Vec<PackageEntity>) =
        entities.into_iter().partition(PackageEntity::is_base);

    let tokens: Vec<Fingerprint> = join_all(
        bases
            .iter()
            .filter_map(PackageEntity::as_base)
            .map(fingerprint),
    )
    .await;

    let mut seen: HashSet<Fingerprint> = HashSet::with_capacity(tokens.len());
    let mut kept: Vec<PackageEntity> = Vec::with_capacity(bases.len());
    for (entity, token) in bases.into_iter().zip(tokens) {
        if seen.insert(token) {
            kept.push(entity);
        } else {
            debug!(entity = %entity, "dropping base with duplicate content fingerprint");
        }
    }

    kept.extend(rest);
    kept
}
