// src/remedy/extract.rs

//! Conflicting-package extraction from raw diagnostics
//!
//! The platform encodes the offending package into a few failure messages
//! and nowhere else, so remediation has to scrape it out. The message
//! format belongs to the platform, not to us; these patterns are
//! deliberately narrow, and every function returns `None` on no match
//! rather than guessing. Callers still offer their remedy without the
//! extracted package in that case.

use regex::Regex;
use std::sync::LazyLock;

static USED_BY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"used by ([\w.]+)").unwrap());

static ALREADY_OWNED_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"already owned by ([\w.]+)").unwrap());

/// Package holding the conflicting content provider, per the platform's
/// `INSTALL_FAILED_CONFLICTING_PROVIDER` message; `None` on no match
pub fn conflicting_provider_package(message: &str) -> Option<String> {
    USED_BY
        .captures(message)
        .map(|caps| caps[1].to_string())
}

/// Package owning the duplicated permission, per the platform's
/// `INSTALL_FAILED_DUPLICATE_PERMISSION` message; `None` on no match
pub fn duplicate_permission_owner(message: &str) -> Option<String> {
    ALREADY_OWNED_BY
        .captures(message)
        .map(|caps| caps[1].to_string())
}
