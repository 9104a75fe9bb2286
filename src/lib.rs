// src/lib.rs

//! Sideload install-session analysis core
//!
//! Takes the installable artifacts a user handed over (APKs, split
//! bundles, zips of several packages), works out what they represent, and
//! produces everything a presentation layer and a privileged backend need
//! to act on the session:
//!
//! - Ingestion: group entities per package, drop redundant copies by
//!   content fingerprint, pair each group with the platform's installed
//!   record
//! - Classification: single app or several, dominant container kind, did
//!   everything come from one file
//! - Identity: staged cheap-to-expensive comparison against the installed
//!   copy, so a byte-identical reinstall can be skipped
//! - Failure handling: closed taxonomies over the platform's legacy status
//!   codes, plus an ordered rule engine proposing safe remediations
//!
//! The privileged backend and the installed-state source are traits
//! ([`session::InstallBackend`], [`model::InstalledStateResolver`]); the
//! crate performs no platform calls of its own.

pub mod analysis;
pub mod archive;
pub mod cli;
pub mod config;
mod error;
pub mod failure;
pub mod hash;
pub mod model;
pub mod remedy;
pub mod session;

pub use analysis::{
    classify_session, compare_identity, deduplicate, fingerprint, IdentityStatus, ProcessedGroup,
    SessionTypeInfo, SignatureMatch, VersionTransition,
};
pub use config::{Authorizer, InstallFlag, InstallFlags, Manufacturer};
pub use error::{Error, Result};
pub use failure::{InstallFailure, InstallFailureKind, UninstallFailure, UninstallFailureKind};
pub use model::{
    BaseEntity, ContainerKind, DataSource, InstalledInfo, InstalledStateResolver, PackageEntity,
};
pub use remedy::{suggest, RemedyContext, Suggestion};
pub use session::{InstallSession, SessionAnalysis, SessionOptions, SessionPhase};
