//! Fingerprint command - print the current stakeholder fingerprint

use crate::cli::args::FingerprintArgs;
use crate::cli::project;
use crate::config::Config;
use crate::error::QuickResult;
use crate::fingerprint::compute_fingerprint;
use crate::manifest::PackageManifest;
use crate::snapshot::SnapshotArtifact;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Serialize)]
struct FingerprintReport {
    fingerprint: String,
    project_name: String,
    runtime_version: Option<String>,
    artifact: PathBuf,
    snapshot_exists: bool,
}

/// Execute the fingerprint command
pub async fn execute(args: FingerprintArgs, config: &Config) -> QuickResult<()> {
    let options = project::install_options(&args.project, config).await?;
    let archive_dir = project::archive_dir(&args.project, config, &options.project_root);

    let fingerprint = compute_fingerprint(&options.sources()).await?;

    if !args.json {
        println!("{}", fingerprint);
        return Ok(());
    }

    let project_name = match PackageManifest::read(&options.manifest_path()).await {
        Ok(manifest) => manifest.artifact_name(),
        Err(e) => {
            debug!("{}", e);
            String::new()
        }
    };
    let artifact = archive_dir
        .join(SnapshotArtifact::new(&project_name, fingerprint.clone()).file_name());

    let report = FingerprintReport {
        fingerprint: fingerprint.to_string(),
        project_name,
        runtime_version: options.runtime_version,
        snapshot_exists: artifact.is_file(),
        artifact,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
