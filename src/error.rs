// src/error.rs

//! Unified error type for the sideload core
//!
//! Classified install/uninstall failures carry their taxonomy kind so that
//! callers (and the remediation engine) can branch on it without string
//! matching. Everything else follows the usual conversion rules: low-level
//! I/O errors are converted to soft fallbacks at component boundaries and
//! only surface here when no fallback exists.

use crate::failure::{InstallFailure, UninstallFailure};
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the sideload core
#[derive(Error, Debug)]
pub enum Error {
    /// Classified installation failure reported by the privileged backend
    #[error("install failed: {0}")]
    Install(InstallFailure),

    /// Classified uninstallation failure reported by the privileged backend
    #[error("uninstall failed: {0}")]
    Uninstall(UninstallFailure),

    /// Session classification was invoked with zero entities
    #[error("session contains no installable entities")]
    EmptySession,

    /// An entity violated a model invariant (e.g. empty package name)
    #[error("invalid entity: {0}")]
    InvalidEntity(String),

    /// The backend stopped reporting before a terminal status was reached
    #[error("backend closed the report stream before a terminal status")]
    BackendClosed,

    /// Archive could not be opened or an entry is missing/corrupt
    #[error("archive error: {0}")]
    Archive(String),

    /// Malformed fixture or report data
    #[error("parse error: {0}")]
    Parse(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The install failure carried by this error, if any.
    ///
    /// Convenience for callers that want to feed the failure straight into
    /// the remediation engine.
    pub fn install_failure(&self) -> Option<&InstallFailure> {
        match self {
            Error::Install(failure) => Some(failure),
            _ => None,
        }
    }
}
