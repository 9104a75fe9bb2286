// src/failure/install.rs

//! Install failure taxonomy over legacy platform codes
//!
//! The table mirrors the platform installer's historical code space:
//! negative codes are platform failures (including the parse-failure block
//! past -100 and vendor extensions past -900), small positive codes are
//! policy failures raised before the platform is ever asked. Every kind
//! resolves to a stable message key the presentation layer can look up.

use std::collections::HashMap;
use std::sync::LazyLock;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Classified install failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum InstallFailureKind {
    AlreadyExists,
    InvalidApk,
    InvalidUri,
    InsufficientStorage,
    DuplicatePackage,
    NoSharedUser,
    UpdateIncompatible,
    SharedUserIncompatible,
    MissingSharedLibrary,
    ReplaceCouldntDelete,
    Dexopt,
    OlderSdk,
    ConflictingProvider,
    NewerSdk,
    TestOnly,
    CpuAbiIncompatible,
    MissingFeature,
    ContainerError,
    InvalidInstallLocation,
    MediaUnavailable,
    VerificationTimeout,
    VerificationFailure,
    PackageChanged,
    UidChanged,
    VersionDowngrade,
    MissingSplit,
    DeprecatedSdkVersion,
    ParseFailedUnexpectedException,
    ParseFailedNoCertificates,
    InternalError,
    UserRestricted,
    DuplicatePermission,
    NoMatchingAbis,
    Aborted,
    ParseFailedSkipped,
    /// Vendor ROM refused the package outright
    VendorBlacklist,
    /// Vendor ROM requires its own installer for this package
    IsolationViolation,
    RejectedByBuildType,
    /// Policy failure raised locally: the package is user-blacklisted
    BlacklistedPackage,
    /// Policy failure raised locally: install permission not granted
    MissingInstallPermission,
    Unknown,
}

static BY_LEGACY_CODE: LazyLock<HashMap<i32, InstallFailureKind>> = LazyLock::new(|| {
    InstallFailureKind::iter()
        .filter(|kind| *kind != InstallFailureKind::Unknown)
        .map(|kind| (kind.legacy_code(), kind))
        .collect()
});

impl InstallFailureKind {
    /// The raw platform code this kind classifies
    pub const fn legacy_code(self) -> i32 {
        match self {
            InstallFailureKind::AlreadyExists => -1,
            InstallFailureKind::InvalidApk => -2,
            InstallFailureKind::InvalidUri => -3,
            InstallFailureKind::InsufficientStorage => -4,
            InstallFailureKind::DuplicatePackage => -5,
            InstallFailureKind::NoSharedUser => -6,
            InstallFailureKind::UpdateIncompatible => -7,
            InstallFailureKind::SharedUserIncompatible => -8,
            InstallFailureKind::MissingSharedLibrary => -9,
            InstallFailureKind::ReplaceCouldntDelete => -10,
            InstallFailureKind::Dexopt => -11,
            InstallFailureKind::OlderSdk => -12,
            InstallFailureKind::ConflictingProvider => -13,
            InstallFailureKind::NewerSdk => -14,
            InstallFailureKind::TestOnly => -15,
            InstallFailureKind::CpuAbiIncompatible => -16,
            InstallFailureKind::MissingFeature => -17,
            InstallFailureKind::ContainerError => -18,
            InstallFailureKind::InvalidInstallLocation => -19,
            InstallFailureKind::MediaUnavailable => -20,
            InstallFailureKind::VerificationTimeout => -21,
            InstallFailureKind::VerificationFailure => -22,
            InstallFailureKind::PackageChanged => -23,
            InstallFailureKind::UidChanged => -24,
            InstallFailureKind::VersionDowngrade => -25,
            InstallFailureKind::MissingSplit => -28,
            InstallFailureKind::DeprecatedSdkVersion => -29,
            InstallFailureKind::ParseFailedUnexpectedException => -102,
            InstallFailureKind::ParseFailedNoCertificates => -103,
            InstallFailureKind::InternalError => -110,
            InstallFailureKind::UserRestricted => -111,
            InstallFailureKind::DuplicatePermission => -112,
            InstallFailureKind::NoMatchingAbis => -113,
            InstallFailureKind::Aborted => -115,
            InstallFailureKind::ParseFailedSkipped => -125,
            InstallFailureKind::VendorBlacklist => -903,
            InstallFailureKind::IsolationViolation => -1000,
            InstallFailureKind::RejectedByBuildType => -3001,
            InstallFailureKind::BlacklistedPackage => 1,
            InstallFailureKind::MissingInstallPermission => 2,
            InstallFailureKind::Unknown => i32::MAX,
        }
    }

    /// Stable key the presentation layer resolves to a user-facing message
    ///
    /// Not one-to-one: the platform's internal error deliberately shares
    /// the generic unknown message, and `NoMatchingAbis` reads the same as
    /// `CpuAbiIncompatible` to the user.
    pub const fn message_key(self) -> &'static str {
        match self {
            InstallFailureKind::AlreadyExists => "install_failed_already_exists",
            InstallFailureKind::InvalidApk => "install_failed_invalid_apk",
            InstallFailureKind::InvalidUri => "install_failed_invalid_uri",
            InstallFailureKind::InsufficientStorage => "install_failed_insufficient_storage",
            InstallFailureKind::DuplicatePackage => "install_failed_duplicate_package",
            InstallFailureKind::NoSharedUser => "install_failed_no_shared_user",
            InstallFailureKind::UpdateIncompatible => "install_failed_update_incompatible",
            InstallFailureKind::SharedUserIncompatible => {
                "install_failed_shared_user_incompatible"
            }
            InstallFailureKind::MissingSharedLibrary => "install_failed_missing_shared_library",
            InstallFailureKind::ReplaceCouldntDelete => "install_failed_replace_couldnt_delete",
            InstallFailureKind::Dexopt => "install_failed_dexopt",
            InstallFailureKind::OlderSdk => "install_failed_older_sdk",
            InstallFailureKind::ConflictingProvider => "install_failed_conflicting_provider",
            InstallFailureKind::NewerSdk => "install_failed_newer_sdk",
            InstallFailureKind::TestOnly => "install_failed_test_only",
            InstallFailureKind::CpuAbiIncompatible => "install_failed_cpu_abi_incompatible",
            InstallFailureKind::MissingFeature => "install_failed_missing_feature",
            InstallFailureKind::ContainerError => "install_failed_container_error",
            InstallFailureKind::InvalidInstallLocation => {
                "install_failed_invalid_install_location"
            }
            InstallFailureKind::MediaUnavailable => "install_failed_media_unavailable",
            InstallFailureKind::VerificationTimeout => "install_failed_verification_timeout",
            InstallFailureKind::VerificationFailure => "install_failed_verification_failure",
            InstallFailureKind::PackageChanged => "install_failed_package_changed",
            InstallFailureKind::UidChanged => "install_failed_uid_changed",
            InstallFailureKind::VersionDowngrade => "install_failed_version_downgrade",
            InstallFailureKind::MissingSplit => "install_failed_missing_split",
            InstallFailureKind::DeprecatedSdkVersion => "install_failed_deprecated_sdk_version",
            InstallFailureKind::ParseFailedUnexpectedException => {
                "install_parse_failed_unexpected_exception"
            }
            InstallFailureKind::ParseFailedNoCertificates => {
                "install_parse_failed_no_certificates"
            }
            InstallFailureKind::InternalError => "install_failed_unknown",
            InstallFailureKind::UserRestricted => "install_failed_user_restricted",
            InstallFailureKind::DuplicatePermission => "install_failed_duplicate_permission",
            InstallFailureKind::NoMatchingAbis => "install_failed_cpu_abi_incompatible",
            InstallFailureKind::Aborted => "install_failed_aborted",
            InstallFailureKind::ParseFailedSkipped => "install_parse_failed_skipped",
            InstallFailureKind::VendorBlacklist => "install_failed_origin_os_blacklist",
            InstallFailureKind::IsolationViolation => {
                "install_failed_hyperos_isolation_violation"
            }
            InstallFailureKind::RejectedByBuildType => "install_failed_rejected_by_build_type",
            InstallFailureKind::BlacklistedPackage => "install_failed_blacklisted_package",
            InstallFailureKind::MissingInstallPermission => {
                "install_failed_missing_install_permission"
            }
            InstallFailureKind::Unknown => "install_failed_unknown",
        }
    }

    /// Classify a raw legacy code; unmapped codes are `Unknown`
    pub fn from_legacy_code(code: i32) -> Self {
        BY_LEGACY_CODE
            .get(&code)
            .copied()
            .unwrap_or(InstallFailureKind::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(
            InstallFailureKind::from_legacy_code(-1),
            InstallFailureKind::AlreadyExists
        );
        assert_eq!(
            InstallFailureKind::from_legacy_code(-25),
            InstallFailureKind::VersionDowngrade
        );
        assert_eq!(
            InstallFailureKind::from_legacy_code(-113),
            InstallFailureKind::NoMatchingAbis
        );
        assert_eq!(
            InstallFailureKind::from_legacy_code(-1000),
            InstallFailureKind::IsolationViolation
        );
        assert_eq!(
            InstallFailureKind::from_legacy_code(-3001),
            InstallFailureKind::RejectedByBuildType
        );
        assert_eq!(
            InstallFailureKind::from_legacy_code(1),
            InstallFailureKind::BlacklistedPackage
        );
        assert_eq!(
            InstallFailureKind::from_legacy_code(2),
            InstallFailureKind::MissingInstallPermission
        );
    }

    #[test]
    fn test_unmapped_codes_are_unknown() {
        assert_eq!(
            InstallFailureKind::from_legacy_code(-9999),
            InstallFailureKind::Unknown
        );
        assert_eq!(
            InstallFailureKind::from_legacy_code(-26),
            InstallFailureKind::Unknown
        );
        assert_eq!(
            InstallFailureKind::from_legacy_code(0),
            InstallFailureKind::Unknown
        );
        assert_eq!(
            InstallFailureKind::from_legacy_code(i32::MAX),
            InstallFailureKind::Unknown
        );
    }

    #[test]
    fn test_total_over_platform_code_range() {
        // Classification must be total: every code in the platform's
        // historical range resolves without panicking.
        for code in -3100..=100 {
            let _ = InstallFailureKind::from_legacy_code(code);
        }
    }

    #[test]
    fn test_codes_round_trip() {
        for kind in InstallFailureKind::iter() {
            if kind == InstallFailureKind::Unknown {
                continue;
            }
            assert_eq!(InstallFailureKind::from_legacy_code(kind.legacy_code()), kind);
        }
    }

    #[test]
    fn test_table_has_no_colliding_codes() {
        // `collect` would silently keep one entry per key; the table is
        // only correct if every kind has a distinct legacy code.
        assert_eq!(
            BY_LEGACY_CODE.len(),
            InstallFailureKind::iter().count() - 1
        );
    }

    #[test]
    fn test_message_key_quirks() {
        // Internal platform errors surface as the generic unknown message
        assert_eq!(
            InstallFailureKind::InternalError.message_key(),
            InstallFailureKind::Unknown.message_key()
        );
        // ABI mismatch reads identically from both codes
        assert_eq!(
            InstallFailureKind::NoMatchingAbis.message_key(),
            InstallFailureKind::CpuAbiIncompatible.message_key()
        );
    }

    #[test]
    fn test_display_is_snake_case() {
        assert_eq!(
            InstallFailureKind::VersionDowngrade.to_string(),
            "version_downgrade"
        );
        assert_eq!(
            InstallFailureKind::ParseFailedNoCertificates.to_string(),
            "parse_failed_no_certificates"
        );
    }
}
