// src/analysis/classify.rs

//! Session shape classification
//!
//! Once groups are deduplicated, the session as a whole needs a shape: is
//! it one application or several, which container kind should be displayed,
//! and did everything arrive as a single physical file. The presentation
//! layer and the backend both key off this descriptor.

use crate::analysis::ProcessedGroup;
use crate::error::{Error, Result};
use crate::model::{ContainerKind, PackageEntity};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Shape of an install session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionTypeInfo {
    /// More than one application is being installed
    pub is_multi_app: bool,
    /// Container kind to present for the session as a whole
    pub container_kind: ContainerKind,
    /// All entities came from one physical file
    pub from_single_file: bool,
}

/// Classify the session shape of deduplicated groups
///
/// Total for any group set that still contains at least one entity; a
/// session with zero entities has no shape and is rejected as a
/// precondition violation.
///
/// A mixed installer+module bundle is always treated as one atomic unit,
/// even when it technically contains several installable things: splitting
/// it would break the install contract. That rule overrides the usual
/// multi-app detection.
pub fn classify_session(groups: &[ProcessedGroup]) -> Result<SessionTypeInfo> {
    let entities: Vec<&PackageEntity> = groups.iter().flat_map(|g| &g.entities).collect();
    let Some(first) = entities.first() else {
        return Err(Error::EmptySession);
    };

    // Distinct outermost source paths; entities without a stable path
    // (pure streams) contribute nothing, and zero paths is not "one file".
    let distinct_paths: HashSet<&Path> = entities
        .iter()
        .filter_map(|e| e.data().source_path())
        .collect();
    let from_single_file = distinct_paths.len() == 1;

    let first_kind = first.container();

    let is_multi_package = groups.len() > 1;
    let has_multiple_bases =
        !is_multi_package && entities.iter().filter(|e| e.is_base()).count() > 1;

    let is_multi_app =
        !first_kind.is_mixed_module() && (is_multi_package || has_multiple_bases);

    let container_kind = if is_multi_app {
        if first_kind == ContainerKind::MultiApkZip {
            ContainerKind::MultiApkZip
        } else {
            ContainerKind::MultiApk
        }
    } else {
        first_kind
    };

    let info = SessionTypeInfo {
        is_multi_app,
        container_kind,
        from_single_file,
    };
    debug!(
        multi_app = info.is_multi_app,
        kind = %info.container_kind,
        single_file = info.from_single_file,
        "classified session"
    );
    Ok(info)
}
