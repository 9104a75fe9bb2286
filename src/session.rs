// src/session.rs

//! Install session state machine and driver
//!
//! Ties the analysis pipeline to a privileged backend behind a small state
//! machine. The driver owns nothing platform-specific: the installed-state
//! resolver and the backend arrive as traits, and every phase transition is
//! visible to an optional observer so an embedder can mirror the session
//! into its own progress surface.
//!
//! # Session lifecycle
//!
//! ```text
//! READY -> RESOLVING -> RESOLVED -> PREPARING -> ANALYSING -> ANALYSED
//!              |                                     |
//!              v                                     v
//!        RESOLVE_FAILED                        ANALYSE_FAILED
//!
//! ANALYSED -> INSTALLING(1/n) .. INSTALLING(n/n) -> COMPLETED -> FINISHED
//!                              |
//!                              v
//!                        INSTALL_FAILED
//! ```
//!
//! Failure phases are resting states, not dead ends: a caller holding the
//! analysis report may commit again (typically after applying a remediation
//! suggestion). Only `finish`, which consumes the session, is terminal.

use crate::analysis::{
    self, compare_identity, signature_match, version_transition, IdentityStatus, ProcessedGroup,
    SessionTypeInfo, SignatureMatch, VersionTransition,
};
use crate::config::InstallFlags;
use crate::error::{Error, Result};
use crate::failure::{verify_install, FollowUpSurface, InstallFailureKind, ReportSource};
use crate::model::{InstalledStateResolver, PackageEntity};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Install session state machine phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Session created, nothing examined yet
    Ready,
    /// Raw entities are being validated
    Resolving,
    /// Validation rejected the input
    ResolveFailed,
    /// Input accepted
    Resolved,
    /// Grouping, de-duplication and installed-state resolution running
    Preparing,
    /// Classification and identity checks running
    Analysing,
    /// Analysis raised an error
    AnalyseFailed,
    /// Analysis report available
    Analysed,
    /// Committing group `current` of `total`
    Installing { current: usize, total: usize },
    /// At least one commit failed
    InstallFailed,
    /// Every group committed or deliberately skipped
    Completed,
    /// Session closed
    Finished,
}

impl SessionPhase {
    /// True for the phases a failed step rests in
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::ResolveFailed | Self::AnalyseFailed | Self::InstallFailed
        )
    }

    /// True once the session can no longer be driven
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("ready"),
            Self::Resolving => f.write_str("resolving"),
            Self::ResolveFailed => f.write_str("resolve_failed"),
            Self::Resolved => f.write_str("resolved"),
            Self::Preparing => f.write_str("preparing"),
            Self::Analysing => f.write_str("analysing"),
            Self::AnalyseFailed => f.write_str("analyse_failed"),
            Self::Analysed => f.write_str("analysed"),
            Self::Installing { current, total } => write!(f, "installing {current}/{total}"),
            Self::InstallFailed => f.write_str("install_failed"),
            Self::Completed => f.write_str("completed"),
            Self::Finished => f.write_str("finished"),
        }
    }
}

/// Observer notified on every phase transition
///
/// Implementations must be thread-safe; the driver calls them inline.
pub trait PhaseObserver: Send + Sync {
    fn phase_changed(&self, phase: SessionPhase);
}

/// Observer that appends every phase to a shared list
///
/// Useful for tests and for surfacing the phase trail in reports.
#[derive(Default)]
pub struct RecordingObserver {
    phases: Mutex<Vec<SessionPhase>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phases seen so far, in transition order
    pub fn phases(&self) -> Vec<SessionPhase> {
        self.phases.lock().unwrap().clone()
    }
}

impl PhaseObserver for RecordingObserver {
    fn phase_changed(&self, phase: SessionPhase) {
        self.phases.lock().unwrap().push(phase);
    }
}

/// Options controlling how a session commits
#[derive(Default)]
pub struct SessionOptions {
    /// Skip groups whose incoming content is byte-identical to the
    /// installed copy
    pub skip_identical: bool,
    /// Install flags passed to the backend on every commit
    pub flags: InstallFlags,
    /// Observer notified on every phase transition
    pub observer: Option<Arc<dyn PhaseObserver>>,
}

impl SessionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip_identical(mut self, skip: bool) -> Self {
        self.skip_identical = skip;
        self
    }

    pub fn with_flags(mut self, flags: InstallFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PhaseObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

/// Privileged backend that commits one analysed group
///
/// The backend starts the platform operation and hands back the report
/// stream for it; the driver runs the verification loop over that stream.
#[async_trait]
pub trait InstallBackend: Send + Sync {
    async fn commit(
        &self,
        group: &ProcessedGroup,
        flags: InstallFlags,
    ) -> Result<Box<dyn ReportSource>>;
}

/// Per-group result of the analysis phase
#[derive(Debug, Clone, Serialize)]
pub struct GroupAnalysis {
    pub group: ProcessedGroup,
    pub identity: IdentityStatus,
    pub signature: SignatureMatch,
    pub transition: VersionTransition,
}

/// Everything the analysis phase learned about a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionAnalysis {
    pub session: SessionTypeInfo,
    pub groups: Vec<GroupAnalysis>,
}

/// How a single group's commit ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Installed {
        package_name: String,
    },
    /// Identical content was already installed and the session was asked
    /// to skip it
    SkippedIdentical {
        package_name: String,
    },
    Failed {
        package_name: String,
        kind: InstallFailureKind,
    },
}

/// Drives one install session from raw entities to committed packages
pub struct InstallSession<R, B> {
    resolver: R,
    backend: B,
    options: SessionOptions,
    phase: SessionPhase,
}

impl<R, B> InstallSession<R, B>
where
    R: InstalledStateResolver,
    B: InstallBackend,
{
    pub fn new(resolver: R, backend: B) -> Self {
        InstallSession {
            resolver,
            backend,
            options: SessionOptions::default(),
            phase: SessionPhase::Ready,
        }
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Current phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    fn enter(&mut self, phase: SessionPhase) {
        debug!(%phase, "session phase");
        self.phase = phase;
        if let Some(ref observer) = self.options.observer {
            observer.phase_changed(phase);
        }
    }

    /// Run the full analysis pipeline over raw entities
    ///
    /// Ends in `Analysed` with the report, or in `ResolveFailed` /
    /// `AnalyseFailed` with the error.
    pub async fn analyse(&mut self, raw: Vec<PackageEntity>) -> Result<SessionAnalysis> {
        self.enter(SessionPhase::Resolving);
        if let Err(err) = resolve(&raw) {
            self.enter(SessionPhase::ResolveFailed);
            return Err(err);
        }
        self.enter(SessionPhase::Resolved);

        match self.run_analysis(raw).await {
            Ok(report) => {
                self.enter(SessionPhase::Analysed);
                Ok(report)
            }
            Err(err) => {
                warn!(error = %err, "session analysis failed");
                self.enter(SessionPhase::AnalyseFailed);
                Err(err)
            }
        }
    }

    async fn run_analysis(&mut self, raw: Vec<PackageEntity>) -> Result<SessionAnalysis> {
        self.enter(SessionPhase::Preparing);
        let groups = analysis::process(raw, &self.resolver).await?;

        self.enter(SessionPhase::Analysing);
        let session = analysis::classify_session(&groups)?;

        let mut analysed = Vec::with_capacity(groups.len());
        for group in groups {
            let base = group.base();
            let installed = group.installed.as_ref();
            let identity = compare_identity(base, installed, session.container_kind).await;
            let signature = signature_match(base, installed);
            let version_code = group
                .entities
                .first()
                .map(|e| e.version_code())
                .unwrap_or_default();
            let transition = version_transition(version_code, installed);
            debug!(
                package = %group.package_name,
                %identity,
                %signature,
                %transition,
                "group analysed"
            );
            analysed.push(GroupAnalysis {
                group,
                identity,
                signature,
                transition,
            });
        }

        info!(
            groups = analysed.len(),
            multi_app = session.is_multi_app,
            kind = %session.container_kind,
            "session analysed"
        );
        Ok(SessionAnalysis {
            session,
            groups: analysed,
        })
    }

    /// Commit every analysed group through the backend
    ///
    /// Multi-app sessions keep going past a failed group and report the
    /// failure in that group's outcome; a single-package session surfaces
    /// the failure directly. Any failure leaves the session in
    /// `InstallFailed`, full success in `Completed`.
    pub async fn commit<U>(
        &mut self,
        analysis: &SessionAnalysis,
        surface: &U,
    ) -> Result<Vec<CommitOutcome>>
    where
        U: FollowUpSurface + ?Sized,
    {
        let total = analysis.groups.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut failed = false;

        for (index, entry) in analysis.groups.iter().enumerate() {
            self.enter(SessionPhase::Installing {
                current: index + 1,
                total,
            });
            let package_name = entry.group.package_name.clone();

            if self.options.skip_identical && entry.identity == IdentityStatus::Identical {
                info!(package = %package_name, "content already installed, skipping commit");
                outcomes.push(CommitOutcome::SkippedIdentical { package_name });
                continue;
            }

            match self.commit_group(&entry.group, surface).await {
                Ok(()) => {
                    info!(package = %package_name, "committed");
                    outcomes.push(CommitOutcome::Installed { package_name });
                }
                Err(err) if analysis.session.is_multi_app => {
                    warn!(package = %package_name, error = %err, "commit failed, continuing batch");
                    failed = true;
                    let kind = err
                        .install_failure()
                        .map(|failure| failure.kind)
                        .unwrap_or(InstallFailureKind::Unknown);
                    outcomes.push(CommitOutcome::Failed { package_name, kind });
                }
                Err(err) => {
                    self.enter(SessionPhase::InstallFailed);
                    return Err(err);
                }
            }
        }

        if failed {
            self.enter(SessionPhase::InstallFailed);
        } else {
            self.enter(SessionPhase::Completed);
        }
        Ok(outcomes)
    }

    async fn commit_group<U>(&self, group: &ProcessedGroup, surface: &U) -> Result<()>
    where
        U: FollowUpSurface + ?Sized,
    {
        let mut source = self.backend.commit(group, self.options.flags).await?;
        verify_install(source.as_mut(), surface).await
    }

    /// Close the session
    ///
    /// Consuming the session is what makes `Finished` terminal.
    pub fn finish(mut self) {
        self.enter(SessionPhase::Finished);
    }
}

fn resolve(raw: &[PackageEntity]) -> Result<()> {
    if raw.is_empty() {
        return Err(Error::EmptySession);
    }
    raw.iter().try_for_each(PackageEntity::validate)
}
