// src/failure/uninstall.rs

//! Uninstall failure taxonomy
//!
//! Much smaller code space than the install side; a direct match is all
//! the lookup needs.

use strum_macros::{Display, EnumIter};

/// Classified uninstall failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum UninstallFailureKind {
    InternalError,
    /// Blocked by an active device policy
    DevicePolicy,
    UserRestricted,
    /// The package is an owner of the device or a profile
    OwnerBlocked,
    Aborted,
    /// Vendor ROM refuses to remove what it considers a system app
    VendorSystemApp,
    Unknown,
}

impl UninstallFailureKind {
    /// The raw platform code this kind classifies
    pub const fn legacy_code(self) -> i32 {
        match self {
            UninstallFailureKind::InternalError => -1,
            UninstallFailureKind::DevicePolicy => -2,
            UninstallFailureKind::UserRestricted => -3,
            UninstallFailureKind::OwnerBlocked => -4,
            UninstallFailureKind::Aborted => -5,
            UninstallFailureKind::VendorSystemApp => -1000,
            UninstallFailureKind::Unknown => i32::MAX,
        }
    }

    /// Stable key the presentation layer resolves to a user-facing message
    ///
    /// Several kinds share the generic unknown message; the platform gives
    /// the user nothing more specific to act on for those.
    pub const fn message_key(self) -> &'static str {
        match self {
            UninstallFailureKind::InternalError => "uninstall_failed_internal_error",
            UninstallFailureKind::DevicePolicy => "install_failed_unknown",
            UninstallFailureKind::UserRestricted => "install_failed_user_restricted",
            UninstallFailureKind::OwnerBlocked => "install_failed_unknown",
            UninstallFailureKind::Aborted => "uninstall_failed_aborted",
            UninstallFailureKind::VendorSystemApp => "uninstall_failed_hyperos_system_app",
            UninstallFailureKind::Unknown => "install_failed_unknown",
        }
    }

    /// Classify a raw legacy code; unmapped codes are `Unknown`
    pub const fn from_legacy_code(code: i32) -> Self {
        match code {
            -1 => UninstallFailureKind::InternalError,
            -2 => UninstallFailureKind::DevicePolicy,
            -3 => UninstallFailureKind::UserRestricted,
            -4 => UninstallFailureKind::OwnerBlocked,
            -5 => UninstallFailureKind::Aborted,
            -1000 => UninstallFailureKind::VendorSystemApp,
            _ => UninstallFailureKind::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_known_codes() {
        assert_eq!(
            UninstallFailureKind::from_legacy_code(-1),
            UninstallFailureKind::InternalError
        );
        assert_eq!(
            UninstallFailureKind::from_legacy_code(-4),
            UninstallFailureKind::OwnerBlocked
        );
        assert_eq!(
            UninstallFailureKind::from_legacy_code(-1000),
            UninstallFailureKind::VendorSystemApp
        );
    }

    #[test]
    fn test_unmapped_codes_are_unknown() {
        assert_eq!(
            UninstallFailureKind::from_legacy_code(0),
            UninstallFailureKind::Unknown
        );
        assert_eq!(
            UninstallFailureKind::from_legacy_code(-9999),
            UninstallFailureKind::Unknown
        );
        assert_eq!(
            UninstallFailureKind::from_legacy_code(7),
            UninstallFailureKind::Unknown
        );
    }

    #[test]
    fn test_total_over_platform_code_range() {
        for code in -3100..=100 {
            let _ = UninstallFailureKind::from_legacy_code(code);
        }
    }

    #[test]
    fn test_codes_round_trip() {
        for kind in UninstallFailureKind::iter() {
            if kind == UninstallFailureKind::Unknown {
                continue;
            }
            assert_eq!(
                UninstallFailureKind::from_legacy_code(kind.legacy_code()),
                kind
            );
        }
    }
}
