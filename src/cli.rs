// src/cli.rs
//! CLI definitions for the sideload analysis tool
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in `main.rs`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Authorizer, Manufacturer};

#[derive(Parser)]
#[command(name = "sideload")]
#[command(author = "Sideload Contributors")]
#[command(version)]
#[command(about = "Install-session analysis: dedup, classification and failure remediation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyse an install session from an entity manifest
    Analyse {
        /// Path to a JSON manifest of installable entities
        manifest: PathBuf,

        /// JSON snapshot of installed packages to compare against
        #[arg(short, long)]
        installed: Option<PathBuf>,

        /// Emit the full per-group report instead of the session summary
        #[arg(long)]
        full: bool,
    },

    /// Compute the content fingerprint of a package file or archive entry
    Fingerprint {
        /// Path to the package file or zip container
        path: PathBuf,

        /// Named entry inside the container, for zip sources
        #[arg(short, long)]
        entry: Option<String>,

        /// Version code used by fallback tokens
        #[arg(long, default_value_t = 0)]
        version_code: i64,
    },

    /// Classify a legacy platform status code
    Classify {
        /// Raw status code, e.g. -25
        code: i32,

        /// Classify through the uninstall taxonomy instead of install
        #[arg(long)]
        uninstall: bool,
    },

    /// List remediation suggestions for a classified install failure
    Suggest {
        /// Raw install status code, e.g. -25
        code: i32,

        /// Raw backend message, used for conflicting-package extraction
        #[arg(short, long)]
        message: Option<String>,

        /// Authorizer performing privileged calls (none, root, broker, owner, other)
        #[arg(long, default_value = "none")]
        authorizer: Authorizer,

        /// Device platform SDK level
        #[arg(long, default_value_t = 34)]
        sdk: u32,

        /// Device manufacturer; unrecognized vendors count as generic
        #[arg(long, default_value = "other")]
        manufacturer: Manufacturer,

        /// The vendor's own privileged installer is present on the device
        #[arg(long)]
        vendor_installer: bool,
    },

    /// List install flags usable in a given environment
    Flags {
        /// Authorizer performing privileged calls (none, root, broker, owner, other)
        #[arg(long, default_value = "none")]
        authorizer: Authorizer,

        /// Device platform SDK level
        #[arg(long, default_value_t = 34)]
        sdk: u32,
    },
}
