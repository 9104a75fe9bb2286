// src/main.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use sideload::analysis::ProcessedGroup;
use sideload::cli::{Cli, Commands};
use sideload::config::{available_flags, Authorizer, InstallFlags, Manufacturer};
use sideload::failure::ReportSource;
use sideload::model::{BaseEntity, ContainerKind, DataSource, PackageEntity, SnapshotResolver};
use sideload::remedy::{suggest, RemedyContext};
use sideload::session::{InstallBackend, InstallSession};
use sideload::{fingerprint, InstallFailure, InstallFailureKind, UninstallFailureKind};
use std::path::{Path, PathBuf};
use tracing::info;

/// Backend for analysis-only runs; the CLI never commits a session
struct NoBackend;

#[async_trait]
impl InstallBackend for NoBackend {
    async fn commit(
        &self,
        _group: &ProcessedGroup,
        _flags: InstallFlags,
    ) -> sideload::Result<Box<dyn ReportSource>> {
        Err(sideload::Error::BackendClosed)
    }
}

async fn analyse(manifest: &Path, installed: Option<&Path>, full: bool) -> Result<()> {
    let raw = std::fs::read_to_string(manifest)
        .with_context(|| format!("reading manifest {}", manifest.display()))?;
    let entities: Vec<PackageEntity> =
        serde_json::from_str(&raw).context("parsing entity manifest")?;
    info!(entities = entities.len(), "loaded manifest");

    let resolver = match installed {
        Some(path) => {
            let snapshot = std::fs::read_to_string(path)
                .with_context(|| format!("reading snapshot {}", path.display()))?;
            SnapshotResolver::from_json(&snapshot)?
        }
        None => SnapshotResolver::empty(),
    };

    let mut session = InstallSession::new(resolver, NoBackend);
    let analysis = session.analyse(entities).await?;

    if full {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&analysis.session)?);
        for group in &analysis.groups {
            println!(
                "{}: {} entities, identity {}, signature {}, {}",
                group.group.package_name,
                group.group.entities.len(),
                group.identity,
                group.signature,
                group.transition,
            );
        }
    }
    Ok(())
}

async fn print_fingerprint(path: PathBuf, entry: Option<String>, version_code: i64) -> Result<()> {
    let data = match entry {
        Some(name) => DataSource::ArchiveEntry {
            archive: path,
            name,
        },
        None => DataSource::File { path },
    };
    let base = BaseEntity {
        package_name: "unresolved".to_string(),
        version_code,
        version_name: String::new(),
        declared_size: 0,
        data,
        container: ContainerKind::Apk,
        signature_digest: None,
        min_sdk: None,
        target_sdk: None,
    };

    println!("{}", fingerprint(&base).await);
    Ok(())
}

fn classify(code: i32, uninstall: bool) {
    if uninstall {
        let kind = UninstallFailureKind::from_legacy_code(code);
        println!("{} (message key: {})", kind, kind.message_key());
    } else {
        let kind = InstallFailureKind::from_legacy_code(code);
        println!("{} (message key: {})", kind, kind.message_key());
    }
}

fn print_suggestions(
    code: i32,
    message: Option<String>,
    authorizer: Authorizer,
    sdk: u32,
    manufacturer: Manufacturer,
    vendor_installer: bool,
) {
    let kind = InstallFailureKind::from_legacy_code(code);
    let diagnostic = format!(
        "status 1#{} [{}]",
        code,
        message.as_deref().unwrap_or("no message")
    );
    let failure = InstallFailure::new(kind, diagnostic);
    let ctx = RemedyContext {
        authorizer,
        device_sdk: sdk,
        manufacturer,
        vendor_installer_present: vendor_installer,
    };

    let suggestions = suggest(&failure, &ctx);
    if suggestions.is_empty() {
        println!("no remediation for {} in this environment", kind);
        return;
    }
    for suggestion in suggestions {
        println!(
            "{} (message key: {}): {:?}",
            suggestion.label,
            suggestion.label.message_key(),
            suggestion.action
        );
    }
}

fn print_flags(authorizer: Authorizer, sdk: u32) {
    for flag in available_flags(authorizer, sdk) {
        println!("{} (0x{:08x})", flag, flag.bits());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Analyse {
            manifest,
            installed,
            full,
        }) => analyse(&manifest, installed.as_deref(), full).await,
        Some(Commands::Fingerprint {
            path,
            entry,
            version_code,
        }) => print_fingerprint(path, entry, version_code).await,
        Some(Commands::Classify { code, uninstall }) => {
            classify(code, uninstall);
            Ok(())
        }
        Some(Commands::Suggest {
            code,
            message,
            authorizer,
            sdk,
            manufacturer,
            vendor_installer,
        }) => {
            print_suggestions(code, message, authorizer, sdk, manufacturer, vendor_installer);
            Ok(())
        }
        Some(Commands::Flags { authorizer, sdk }) => {
            print_flags(authorizer, sdk);
            Ok(())
        }
        None => {
            // No command provided, show help
            println!("sideload v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'sideload --help' for usage information");
            Ok(())
        }
    }
}
