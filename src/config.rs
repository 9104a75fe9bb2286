// src/config.rs

//! Install environment and privileged-commit flag sets
//!
//! Everything the analysis layer needs to know about the device it is
//! running on lives here: which authorizer performs privileged calls, the
//! platform SDK level, and the vendor fingerprint. Flags mirror the
//! platform installer's bit values so a flag set can be handed to a
//! backend unchanged.

use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Platform SDK levels referenced by flag gating and remediation rules
pub mod sdk {
    /// Android 6.0, runtime permission model
    pub const M: u32 = 23;
    /// Android 7.0
    pub const N: u32 = 24;
    /// Android 8.0
    pub const O: u32 = 26;
    /// Android 10
    pub const Q: u32 = 29;
    /// Android 14, downgrade handling changed
    pub const UPSIDE_DOWN_CAKE: u32 = 34;
    /// Android 15
    pub const VANILLA_ICE_CREAM: u32 = 35;
    /// Android 16
    pub const BAKLAVA: u32 = 36;
}

/// How privileged package-manager calls are performed
///
/// `Owner` is a device-owner style delegate: it can commit sessions but
/// cannot freely re-route them, which matters to a few remediation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Authorizer {
    /// Plain unprivileged session, user confirmation required
    None,
    Root,
    /// Privileged broker service exposing shell-level calls
    Broker,
    /// Device-owner delegate
    Owner,
    Other,
}

impl Authorizer {
    /// Whether this authorizer can uninstall packages without user steps
    pub fn is_privileged(self) -> bool {
        matches!(self, Authorizer::Root | Authorizer::Broker)
    }
}

/// Device vendor, as far as remediation cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Manufacturer {
    Google,
    Samsung,
    Xiaomi,
    Realme,
    Other,
}

impl Manufacturer {
    /// Map a raw vendor string to a known manufacturer
    ///
    /// Unrecognized vendors fold into `Other` rather than failing; rules
    /// conditioned on a specific vendor simply never match there.
    pub fn from_vendor(vendor: &str) -> Self {
        match vendor.trim().to_lowercase().as_str() {
            "google" => Manufacturer::Google,
            "samsung" => Manufacturer::Samsung,
            "xiaomi" | "redmi" | "poco" => Manufacturer::Xiaomi,
            "realme" => Manufacturer::Realme,
            _ => Manufacturer::Other,
        }
    }
}

impl FromStr for Manufacturer {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Manufacturer::from_vendor(s))
    }
}

/// A single install flag with its platform bit value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum InstallFlag {
    ReplaceExisting,
    /// Accept packages marked test-only
    AllowTest,
    AllUsers,
    /// Accept a version code lower than the installed one
    AllowDowngrade,
    GrantAllPermissions,
    InstantApp,
    DontKillApp,
    FullApp,
    Apex,
    EnableRollback,
    DisableVerification,
    Staged,
    /// Skip the low-target-SDK install block introduced in SDK 34
    BypassLowTargetSdk,
    RequestUpdateOwnership,
}

impl InstallFlag {
    /// The platform bit value for this flag
    pub const fn bits(self) -> u32 {
        match self {
            InstallFlag::ReplaceExisting => 0x0000_0002,
            InstallFlag::AllowTest => 0x0000_0004,
            InstallFlag::AllUsers => 0x0000_0040,
            // Legacy and modern downgrade bits are always set together
            InstallFlag::AllowDowngrade => 0x0000_0080 | 0x0010_0000,
            InstallFlag::GrantAllPermissions => 0x0000_0100,
            InstallFlag::InstantApp => 0x0000_0800,
            InstallFlag::DontKillApp => 0x0000_1000,
            InstallFlag::FullApp => 0x0000_4000,
            InstallFlag::Apex => 0x0002_0000,
            InstallFlag::EnableRollback => 0x0004_0000,
            InstallFlag::DisableVerification => 0x0008_0000,
            InstallFlag::Staged => 0x0020_0000,
            InstallFlag::BypassLowTargetSdk => 0x0100_0000,
            InstallFlag::RequestUpdateOwnership => 1 << 25,
        }
    }

    /// Lowest SDK level where the platform understands this flag
    pub const fn min_sdk(self) -> u32 {
        match self {
            InstallFlag::ReplaceExisting
            | InstallFlag::AllowTest
            | InstallFlag::AllUsers
            | InstallFlag::AllowDowngrade => 1,
            InstallFlag::GrantAllPermissions => sdk::M,
            InstallFlag::DontKillApp => sdk::N,
            InstallFlag::InstantApp | InstallFlag::FullApp => sdk::O,
            InstallFlag::Apex
            | InstallFlag::EnableRollback
            | InstallFlag::DisableVerification
            | InstallFlag::Staged => sdk::Q,
            InstallFlag::BypassLowTargetSdk | InstallFlag::RequestUpdateOwnership => {
                sdk::UPSIDE_DOWN_CAKE
            }
        }
    }

    /// Whether the flag can be used in the given environment
    ///
    /// Downgrades require a privileged authorizer: the platform rejects the
    /// flag from ordinary callers.
    pub fn available(self, authorizer: Authorizer, device_sdk: u32) -> bool {
        if device_sdk < self.min_sdk() {
            return false;
        }
        match self {
            InstallFlag::AllowDowngrade => authorizer.is_privileged(),
            _ => true,
        }
    }
}

/// All flags usable in the given environment, in declaration order
pub fn available_flags(authorizer: Authorizer, device_sdk: u32) -> Vec<InstallFlag> {
    InstallFlag::iter()
        .filter(|flag| flag.available(authorizer, device_sdk))
        .collect()
}

/// A combined install flag set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallFlags(u32);

impl InstallFlags {
    pub const fn empty() -> Self {
        InstallFlags(0)
    }

    /// Add a flag, builder style
    pub const fn with(self, flag: InstallFlag) -> Self {
        InstallFlags(self.0 | flag.bits())
    }

    pub fn insert(&mut self, flag: InstallFlag) {
        self.0 |= flag.bits();
    }

    pub fn remove(&mut self, flag: InstallFlag) {
        self.0 &= !flag.bits();
    }

    pub const fn contains(self, flag: InstallFlag) -> bool {
        self.0 & flag.bits() == flag.bits()
    }

    /// Raw bit value to hand to a platform backend
    pub const fn bits(self) -> u32 {
        self.0
    }
}

/// A single uninstall flag with its platform bit value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum UninstallFlag {
    /// Remove the package but keep its data and cache directories
    KeepData,
    AllUsers,
    SystemApp,
}

impl UninstallFlag {
    pub const fn bits(self) -> u32 {
        match self {
            UninstallFlag::KeepData => 0x0000_0001,
            UninstallFlag::AllUsers => 0x0000_0002,
            UninstallFlag::SystemApp => 0x0000_0004,
        }
    }
}

/// A combined uninstall flag set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UninstallFlags(u32);

impl UninstallFlags {
    pub const fn empty() -> Self {
        UninstallFlags(0)
    }

    pub const fn with(self, flag: UninstallFlag) -> Self {
        UninstallFlags(self.0 | flag.bits())
    }

    pub const fn contains(self, flag: UninstallFlag) -> bool {
        self.0 & flag.bits() == flag.bits()
    }

    pub const fn bits(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorizer_parse() {
        assert_eq!("root".parse::<Authorizer>().unwrap(), Authorizer::Root);
        assert_eq!("Broker".parse::<Authorizer>().unwrap(), Authorizer::Broker);
        assert_eq!("NONE".parse::<Authorizer>().unwrap(), Authorizer::None);
        assert!("shell".parse::<Authorizer>().is_err());
    }

    #[test]
    fn test_manufacturer_fallback() {
        assert_eq!(Manufacturer::from_vendor("Samsung"), Manufacturer::Samsung);
        assert_eq!(Manufacturer::from_vendor("POCO"), Manufacturer::Xiaomi);
        assert_eq!(Manufacturer::from_vendor("OnePlus"), Manufacturer::Other);
        assert_eq!(Manufacturer::from_vendor(""), Manufacturer::Other);
    }

    #[test]
    fn test_flag_bits() {
        assert_eq!(InstallFlag::ReplaceExisting.bits(), 0x2);
        assert_eq!(InstallFlag::AllowTest.bits(), 0x4);
        assert_eq!(InstallFlag::AllowDowngrade.bits(), 0x0010_0080);
        assert_eq!(InstallFlag::BypassLowTargetSdk.bits(), 0x0100_0000);
        assert_eq!(InstallFlag::RequestUpdateOwnership.bits(), 0x0200_0000);
    }

    #[test]
    fn test_flag_set_ops() {
        let mut flags = InstallFlags::empty()
            .with(InstallFlag::ReplaceExisting)
            .with(InstallFlag::AllowTest);

        assert!(flags.contains(InstallFlag::ReplaceExisting));
        assert!(flags.contains(InstallFlag::AllowTest));
        assert!(!flags.contains(InstallFlag::AllowDowngrade));
        assert_eq!(flags.bits(), 0x6);

        flags.remove(InstallFlag::AllowTest);
        assert!(!flags.contains(InstallFlag::AllowTest));

        flags.insert(InstallFlag::AllowDowngrade);
        assert!(flags.contains(InstallFlag::AllowDowngrade));
    }

    #[test]
    fn test_downgrade_needs_privilege() {
        assert!(InstallFlag::AllowDowngrade.available(Authorizer::Root, 33));
        assert!(InstallFlag::AllowDowngrade.available(Authorizer::Broker, 33));
        assert!(!InstallFlag::AllowDowngrade.available(Authorizer::None, 33));
        assert!(!InstallFlag::AllowDowngrade.available(Authorizer::Owner, 33));
    }

    #[test]
    fn test_sdk_gating() {
        assert!(!InstallFlag::BypassLowTargetSdk.available(Authorizer::Root, 33));
        assert!(InstallFlag::BypassLowTargetSdk.available(Authorizer::Root, 34));
        assert!(!InstallFlag::Apex.available(Authorizer::Root, 28));
        assert!(InstallFlag::Apex.available(Authorizer::Root, 29));
    }

    #[test]
    fn test_available_flags_declaration_order() {
        let flags = available_flags(Authorizer::Root, sdk::UPSIDE_DOWN_CAKE);
        // Everything is available on a rooted SDK 34 device
        assert_eq!(flags.len(), InstallFlag::iter().count());
        assert_eq!(flags.first(), Some(&InstallFlag::ReplaceExisting));

        let unprivileged = available_flags(Authorizer::None, sdk::Q);
        assert!(!unprivileged.contains(&InstallFlag::AllowDowngrade));
        assert!(!unprivileged.contains(&InstallFlag::BypassLowTargetSdk));
    }

    #[test]
    fn test_uninstall_flags() {
        let flags = UninstallFlags::empty().with(UninstallFlag::KeepData);
        assert_eq!(flags.bits(), 0x1);
        assert!(flags.contains(UninstallFlag::KeepData));
        assert!(!flags.contains(UninstallFlag::AllUsers));
    }
}
