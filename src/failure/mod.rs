// src/failure/mod.rs

//! Closed failure taxonomies and the commit verification loop
//!
//! Privileged backends report raw integer status codes. Everything above
//! this module works with the closed [`InstallFailureKind`] and
//! [`UninstallFailureKind`] enumerations instead; classification is total,
//! unmapped codes fold into `Unknown`, and the raw code plus message always
//! survive inside the diagnostic string.

pub mod install;
pub mod uninstall;
pub mod verify;

pub use install::InstallFailureKind;
pub use uninstall::UninstallFailureKind;
pub use verify::{
    verify_install, verify_uninstall, BackendReport, CommitStatus, FollowUpAction,
    FollowUpSurface, ReportSource,
};

use std::fmt;

/// A classified install failure with its raw diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallFailure {
    pub kind: InstallFailureKind,
    /// Raw status, legacy code and backend message, for support and logs
    pub diagnostic: String,
}

impl InstallFailure {
    pub fn new(kind: InstallFailureKind, diagnostic: impl Into<String>) -> Self {
        InstallFailure {
            kind,
            diagnostic: diagnostic.into(),
        }
    }

    pub fn is(&self, kind: InstallFailureKind) -> bool {
        self.kind == kind
    }

    pub fn is_any(&self, kinds: &[InstallFailureKind]) -> bool {
        kinds.contains(&self.kind)
    }
}

impl fmt::Display for InstallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.diagnostic)
    }
}

/// A classified uninstall failure with its raw diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallFailure {
    pub kind: UninstallFailureKind,
    pub diagnostic: String,
}

impl UninstallFailure {
    pub fn new(kind: UninstallFailureKind, diagnostic: impl Into<String>) -> Self {
        UninstallFailure {
            kind,
            diagnostic: diagnostic.into(),
        }
    }

    pub fn is(&self, kind: UninstallFailureKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for UninstallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.diagnostic)
    }
}
