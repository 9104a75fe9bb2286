// src/remedy/mod.rs

//! Ordered remediation rules for classified install failures
//!
//! When a commit fails, the presentation layer wants actionable ways out,
//! not just an error message. Each rule pairs a predicate over the failure
//! and the device environment with the action a user could take. The table
//! is plain data, evaluated top to bottom; matching rules come back in
//! declaration order, and several rules may fire for the same failure
//! (distinct remedies for the same downgrade, for example).
//!
//! The engine is pure. It never touches ambient state and never performs
//! the suggested action; invoking one is the caller's business.

pub mod extract;

use crate::config::{sdk, Authorizer, InstallFlag, Manufacturer};
use crate::failure::{InstallFailure, InstallFailureKind};
use strum_macros::Display;
use tracing::debug;

/// Device environment the rules are conditioned on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemedyContext {
    pub authorizer: Authorizer,
    pub device_sdk: u32,
    pub manufacturer: Manufacturer,
    /// The vendor's own privileged installer app is present on the device
    pub vendor_installer_present: bool,
}

/// Stable label identifying a suggestion to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SuggestionLabel {
    AllowTestPackage,
    UninstallAndRetry,
    UninstallAndRetryKeepData,
    AllowDowngrade,
    SwitchVendorInstaller,
    SwitchVendorInstallerViaBroker,
    OpenDeveloperSettings,
    BypassLowTargetSdk,
    BypassBlacklist,
    Retry,
}

impl SuggestionLabel {
    /// Stable key the presentation layer resolves to a user-facing message
    pub const fn message_key(self) -> &'static str {
        match self {
            SuggestionLabel::AllowTestPackage => "suggestion_allow_test_app",
            SuggestionLabel::UninstallAndRetry => "suggestion_uninstall_and_retry",
            SuggestionLabel::UninstallAndRetryKeepData => {
                "suggestion_uninstall_and_retry_keep_data"
            }
            SuggestionLabel::AllowDowngrade => "suggestion_allow_downgrade",
            SuggestionLabel::SwitchVendorInstaller => "suggestion_vendor_installer",
            SuggestionLabel::SwitchVendorInstallerViaBroker => {
                "suggestion_vendor_installer_broker"
            }
            SuggestionLabel::OpenDeveloperSettings => "suggestion_user_restricted",
            SuggestionLabel::BypassLowTargetSdk => "suggestion_bypass_low_target_sdk",
            SuggestionLabel::BypassBlacklist => "suggestion_bypass_blacklist_set_by_user",
            SuggestionLabel::Retry => "retry",
        }
    }
}

/// Vendor installer package a session can be re-routed through
pub const VENDOR_INSTALLER_PACKAGE: &str = "com.miui.packageinstaller";

/// What invoking a suggestion should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemedyAction {
    /// Re-commit with an extra install flag set
    RetryWithFlag(InstallFlag),
    /// Uninstall the blocking package first, then retry the install
    ///
    /// `conflicting_package` is the extracted blocker when the diagnostic
    /// named one; `None` means the session's own target package.
    UninstallFirst {
        keep_data: bool,
        conflicting_package: Option<String>,
    },
    /// Re-route the session through the vendor's own installer
    ///
    /// `via_broker` re-authorizes through the privileged broker as well;
    /// without it the session keeps its authorizer and only clears its
    /// originating identity.
    SwitchInstaller {
        installer: &'static str,
        via_broker: bool,
    },
    /// Send the user to developer settings to lift the restriction
    OpenDeveloperSettings,
    /// Lift the user-configured blacklist for this package and retry
    BypassBlacklist,
    Retry,
}

/// One matched remediation: label plus concrete action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub label: SuggestionLabel,
    pub action: RemedyAction,
}

/// A remediation rule: a predicate and an action builder over
/// `(failure, context)`
pub struct RemediationRule {
    label: SuggestionLabel,
    matches: fn(&InstallFailure, &RemedyContext) -> bool,
    build: fn(&InstallFailure, &RemedyContext) -> RemedyAction,
}

impl RemediationRule {
    pub fn label(&self) -> SuggestionLabel {
        self.label
    }
}

/// Whether this environment can uninstall a blocking package at all
///
/// Unprivileged sessions lose that ability when the vendor forces its own
/// installer into the uninstall path.
fn can_uninstall_blocker(ctx: &RemedyContext) -> bool {
    ctx.authorizer != Authorizer::None
        || !(ctx.manufacturer == Manufacturer::Xiaomi && ctx.vendor_installer_present)
}

/// The rule table, in presentation priority order
static RULES: &[RemediationRule] = &[
    RemediationRule {
        label: SuggestionLabel::AllowTestPackage,
        matches: |failure, _| failure.is(InstallFailureKind::TestOnly),
        build: |_, _| RemedyAction::RetryWithFlag(InstallFlag::AllowTest),
    },
    RemediationRule {
        label: SuggestionLabel::UninstallAndRetry,
        matches: |failure, ctx| {
            failure.is(InstallFailureKind::ConflictingProvider) && can_uninstall_blocker(ctx)
        },
        build: |failure, _| RemedyAction::UninstallFirst {
            keep_data: false,
            conflicting_package: extract::conflicting_provider_package(&failure.diagnostic),
        },
    },
    RemediationRule {
        label: SuggestionLabel::UninstallAndRetry,
        matches: |failure, ctx| {
            failure.is(InstallFailureKind::DuplicatePermission) && can_uninstall_blocker(ctx)
        },
        build: |failure, _| RemedyAction::UninstallFirst {
            keep_data: false,
            conflicting_package: extract::duplicate_permission_owner(&failure.diagnostic),
        },
    },
    RemediationRule {
        label: SuggestionLabel::UninstallAndRetry,
        matches: |failure, ctx| {
            failure.is_any(&[
                InstallFailureKind::UpdateIncompatible,
                InstallFailureKind::VersionDowngrade,
            ]) && can_uninstall_blocker(ctx)
        },
        build: |_, _| RemedyAction::UninstallFirst {
            keep_data: false,
            conflicting_package: None,
        },
    },
    // Downgrade on SDK 34 and 35: the platform refuses the downgrade flag,
    // but removing the app while keeping its data gets the user there.
    // Samsung and Realme broke that path from SDK 35 on, and SDK 36
    // removed it entirely.
    RemediationRule {
        label: SuggestionLabel::UninstallAndRetryKeepData,
        matches: |failure, ctx| {
            failure.is(InstallFailureKind::VersionDowngrade)
                && ctx.device_sdk >= sdk::UPSIDE_DOWN_CAKE
                && ctx.device_sdk < sdk::BAKLAVA
                && !(ctx.device_sdk >= sdk::VANILLA_ICE_CREAM
                    && matches!(
                        ctx.manufacturer,
                        Manufacturer::Samsung | Manufacturer::Realme
                    ))
                && ctx.authorizer.is_privileged()
        },
        build: |_, _| RemedyAction::UninstallFirst {
            keep_data: true,
            conflicting_package: None,
        },
    },
    // Before SDK 34 a privileged session can simply pass the downgrade flag
    RemediationRule {
        label: SuggestionLabel::AllowDowngrade,
        matches: |failure, ctx| {
            failure.is(InstallFailureKind::VersionDowngrade)
                && ctx.device_sdk < sdk::UPSIDE_DOWN_CAKE
                && ctx.authorizer.is_privileged()
        },
        build: |_, _| RemedyAction::RetryWithFlag(InstallFlag::AllowDowngrade),
    },
    RemediationRule {
        label: SuggestionLabel::SwitchVendorInstaller,
        matches: |failure, ctx| {
            failure.is(InstallFailureKind::IsolationViolation)
                && ctx.authorizer != Authorizer::Owner
        },
        build: |_, _| RemedyAction::SwitchInstaller {
            installer: VENDOR_INSTALLER_PACKAGE,
            via_broker: false,
        },
    },
    // A device-owner session cannot re-route itself; it has to hop through
    // the broker to reach the vendor installer.
    RemediationRule {
        label: SuggestionLabel::SwitchVendorInstallerViaBroker,
        matches: |failure, ctx| {
            failure.is(InstallFailureKind::IsolationViolation)
                && ctx.authorizer == Authorizer::Owner
        },
        build: |_, _| RemedyAction::SwitchInstaller {
            installer: VENDOR_INSTALLER_PACKAGE,
            via_broker: true,
        },
    },
    RemediationRule {
        label: SuggestionLabel::OpenDeveloperSettings,
        matches: |failure, _| failure.is(InstallFailureKind::UserRestricted),
        build: |_, _| RemedyAction::OpenDeveloperSettings,
    },
    RemediationRule {
        label: SuggestionLabel::BypassLowTargetSdk,
        matches: |failure, _| failure.is(InstallFailureKind::DeprecatedSdkVersion),
        build: |_, _| RemedyAction::RetryWithFlag(InstallFlag::BypassLowTargetSdk),
    },
    RemediationRule {
        label: SuggestionLabel::BypassBlacklist,
        matches: |failure, _| failure.is(InstallFailureKind::BlacklistedPackage),
        build: |_, _| RemedyAction::BypassBlacklist,
    },
    RemediationRule {
        label: SuggestionLabel::Retry,
        matches: |failure, _| failure.is(InstallFailureKind::MissingInstallPermission),
        build: |_, _| RemedyAction::Retry,
    },
];

/// Evaluate every rule against a failure; matches in declaration order
///
/// Extraction failures inside an action builder degrade to a `None`
/// parameter, never to a dropped suggestion.
pub fn suggest(failure: &InstallFailure, ctx: &RemedyContext) -> Vec<Suggestion> {
    let suggestions: Vec<Suggestion> = RULES
        .iter()
        .filter(|rule| (rule.matches)(failure, ctx))
        .map(|rule| Suggestion {
            label: rule.label,
            action: (rule.build)(failure, ctx),
        })
        .collect();

    debug!(
        kind = %failure.kind,
        matched = suggestions.len(),
        "evaluated remediation rules"
    );
    suggestions
}
