// src/failure/verify.rs

//! Commit verification loop
//!
//! After a commit is handed to the privileged backend, the backend streams
//! status reports back. Most commits produce exactly one report; the
//! interesting case is "pending user action", where the backend needs a
//! follow-up dispatched (typically a confirmation surface shown to the
//! user) before it reports again. The loop re-dispatches and keeps
//! listening; it is bounded by the backend completing, not by this layer.
//!
//! Anything that is neither success nor actionable pending state is
//! classified through the failure taxonomy and raised as a typed error
//! carrying the full raw diagnostic.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::failure::install::InstallFailureKind;
use crate::failure::uninstall::UninstallFailureKind;
use crate::failure::{InstallFailure, UninstallFailure};

/// Coarse status of one backend report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    Success,
    /// The backend cannot proceed until a follow-up action is dispatched
    PendingUserAction,
    Failure,
}

impl CommitStatus {
    /// Raw platform status value, used in diagnostics
    pub const fn code(self) -> i32 {
        match self {
            CommitStatus::PendingUserAction => -1,
            CommitStatus::Success => 0,
            CommitStatus::Failure => 1,
        }
    }
}

/// Opaque follow-up the backend wants dispatched before it can proceed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpAction(String);

impl FollowUpAction {
    pub fn new(token: impl Into<String>) -> Self {
        FollowUpAction(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

/// One status report from the privileged backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendReport {
    pub status: CommitStatus,
    /// Legacy failure code, when the backend supplied one
    pub legacy_code: Option<i32>,
    /// Raw human-oriented message, when the backend supplied one
    pub message: Option<String>,
    /// Present when the status asks for a follow-up dispatch
    pub follow_up: Option<FollowUpAction>,
}

impl BackendReport {
    pub fn success() -> Self {
        BackendReport {
            status: CommitStatus::Success,
            legacy_code: None,
            message: None,
            follow_up: None,
        }
    }

    pub fn pending(action: FollowUpAction) -> Self {
        BackendReport {
            status: CommitStatus::PendingUserAction,
            legacy_code: None,
            message: None,
            follow_up: Some(action),
        }
    }

    pub fn failure(legacy_code: i32, message: impl Into<String>) -> Self {
        BackendReport {
            status: CommitStatus::Failure,
            legacy_code: Some(legacy_code),
            message: Some(message.into()),
            follow_up: None,
        }
    }
}

/// Stream of status reports for one in-flight commit
#[async_trait]
pub trait ReportSource: Send {
    /// Next report; errors when the backend goes away without a terminal
    /// report
    async fn recv(&mut self) -> Result<BackendReport>;
}

/// Dispatcher for follow-up actions the backend requests
#[async_trait]
pub trait FollowUpSurface: Send + Sync {
    async fn dispatch(&self, action: FollowUpAction) -> Result<()>;
}

fn render_code(code: Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

fn render_diagnostic(report: &BackendReport) -> String {
    format!(
        "status {}#{} [{}]",
        report.status.code(),
        render_code(report.legacy_code),
        report.message.as_deref().unwrap_or("no message")
    )
}

/// Drive an install commit to completion
///
/// Pending reports with a follow-up are dispatched and the loop continues;
/// a pending report with nothing to dispatch cannot make progress and is
/// classified like a failure.
pub async fn verify_install<S, U>(source: &mut S, surface: &U) -> Result<()>
where
    S: ReportSource + ?Sized,
    U: FollowUpSurface + ?Sized,
{
    loop {
        let report = source.recv().await?;
        match report.status {
            CommitStatus::Success => return Ok(()),
            CommitStatus::PendingUserAction => {
                if let Some(action) = report.follow_up {
                    debug!("install pending user action, dispatching follow-up");
                    surface.dispatch(action).await?;
                    continue;
                }
            }
            CommitStatus::Failure => {}
        }

        let kind = report
            .legacy_code
            .map_or(InstallFailureKind::Unknown, InstallFailureKind::from_legacy_code);
        let diagnostic = render_diagnostic(&report);
        warn!(kind = %kind, %diagnostic, "install commit failed");
        return Err(Error::Install(InstallFailure::new(kind, diagnostic)));
    }
}

/// Drive an uninstall commit to completion
///
/// Same contract as [`verify_install`], classified through the uninstall
/// taxonomy.
pub async fn verify_uninstall<S, U>(source: &mut S, surface: &U) -> Result<()>
where
    S: ReportSource + ?Sized,
    U: FollowUpSurface + ?Sized,
{
    loop {
        let report = source.recv().await?;
        match report.status {
            CommitStatus::Success => return Ok(()),
            CommitStatus::PendingUserAction => {
                if let Some(action) = report.follow_up {
                    debug!("uninstall pending user action, dispatching follow-up");
                    surface.dispatch(action).await?;
                    continue;
                }
            }
            CommitStatus::Failure => {}
        }

        let kind = report
            .legacy_code
            .map_or(UninstallFailureKind::Unknown, UninstallFailureKind::from_legacy_code);
        let diagnostic = render_diagnostic(&report);
        warn!(kind = %kind, %diagnostic, "uninstall commit failed");
        return Err(Error::Uninstall(UninstallFailure::new(kind, diagnostic)));
    }
}
