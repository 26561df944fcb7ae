//! Project discovery shared by the project-aware commands

use crate::cli::args::ProjectArgs;
use crate::config::Config;
use crate::disk::SystemProbe;
use crate::error::{QuickError, QuickResult};
use crate::install::{probe_runtime_version, InstallOptions, NpmCommand, Orchestrator};
use crate::snapshot::{SnapshotStore, TarArchiver};
use crate::ui::UiContext;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Nearest ancestor of `start` (itself included) holding the manifest, else `start`
pub fn find_project_root(start: &Path, manifest_file: &str) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(manifest_file).is_file())
        .unwrap_or(start)
        .to_path_buf()
}

/// Project root from `--project` or discovered from the working directory
pub fn project_root(args: &ProjectArgs, config: &Config) -> QuickResult<PathBuf> {
    if let Some(ref path) = args.project {
        return Ok(path.clone());
    }
    let cwd =
        std::env::current_dir().map_err(|e| QuickError::io("getting current directory", e))?;
    let root = find_project_root(&cwd, &config.project.manifest_file);
    debug!("Project root: {}", root.display());
    Ok(root)
}

/// Archive directory from `--archive-dir`, else from config
pub fn archive_dir(args: &ProjectArgs, config: &Config, project_root: &Path) -> PathBuf {
    match args.archive_dir {
        Some(ref dir) => dir.clone(),
        None => config.cache.archive_dir_for(project_root),
    }
}

/// Configured runtime version, or whatever the runtime reports
pub async fn runtime_version(config: &Config) -> Option<String> {
    if let Some(ref version) = config.runtime.version {
        return Some(version.clone());
    }
    let version = probe_runtime_version(&config.runtime.command).await;
    if version.is_none() {
        debug!(
            "Could not determine the {} version, leaving it out of the fingerprint",
            config.runtime.command
        );
    }
    version
}

/// Settings for one project
pub async fn install_options(args: &ProjectArgs, config: &Config) -> QuickResult<InstallOptions> {
    let root = project_root(args, config)?;
    let runtime = runtime_version(config).await;
    Ok(InstallOptions::new(root, config, runtime))
}

/// Orchestrator wired to npm, tar and df/du
pub async fn orchestrator(
    args: &ProjectArgs,
    config: &Config,
    ctx: &UiContext,
) -> QuickResult<Orchestrator> {
    let options = install_options(args, config).await?;
    let store = SnapshotStore::new(
        archive_dir(args, config, &options.project_root),
        Box::new(TarArchiver::new(config.cache.compression_level)),
    );
    let npm = NpmCommand::new(config.install.package_manager.clone(), ctx.clone());

    Ok(Orchestrator::new(
        options,
        store,
        Box::new(npm),
        Box::new(SystemProbe),
        ctx.clone(),
    ))
}
