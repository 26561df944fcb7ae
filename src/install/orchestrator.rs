//! Install orchestrator
//!
//! One run walks this state machine, strictly one step at a time:
//!
//! ```text
//! Start ──snapshot exists──▶ Restoring ──ok──▶ Done
//!   │                            └──error──▶ Failed
//!   └──no snapshot──▶ Installing ──first success──▶ save ──▶ Done
//!                         └──plan exhausted──▶ Failed
//! ```
//!
//! Fatal conditions come back as `Err`. Advisory ones (failed probes, failed
//! fallback attempts, failed saves) are shown as they happen and collected in
//! [`Warnings`].

use crate::config::schema::{Config, ProjectConfig};
use crate::disk::{format_bytes, SpaceProbe};
use crate::error::{QuickError, QuickResult};
use crate::fingerprint::{compute_fingerprint, Fingerprint, StakeholderSources};
use crate::install::runner::PackageManager;
use crate::install::strategy::{select_plan, InstallStrategy};
use crate::manifest::{in_sync, PackageLock, PackageManifest};
use crate::snapshot::{SaveOutcome, SnapshotArtifact, SnapshotStore};
use crate::ui::{self, TaskSpinner, UiContext};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Per-run settings
#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub project_root: PathBuf,
    pub files: ProjectConfig,
    pub runtime_version: Option<String>,
    pub require_lockfile: bool,
    pub require_lockfile_in_sync: bool,
    /// Free-space warning threshold in bytes
    pub disk_warning_threshold: u64,
}

impl InstallOptions {
    pub fn new(project_root: PathBuf, config: &Config, runtime_version: Option<String>) -> Self {
        Self {
            project_root,
            files: config.project.clone(),
            runtime_version,
            require_lockfile: config.install.require_lockfile,
            require_lockfile_in_sync: config.install.require_lockfile_in_sync,
            disk_warning_threshold: config.cache.disk_warning_threshold(),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.project_root.join(&self.files.manifest_file)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.project_root.join(&self.files.lock_file)
    }

    pub fn dependency_dir(&self) -> PathBuf {
        self.project_root.join(&self.files.dependency_dir)
    }

    pub fn sources(&self) -> StakeholderSources {
        StakeholderSources {
            manifest: self.manifest_path(),
            lock_file: self.lock_path(),
            env_config: self.project_root.join(&self.files.env_config_file),
            runtime_version: self.runtime_version.clone(),
        }
    }
}

/// Facts that pick the branch of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallDecision {
    pub lock_file_present: bool,
    pub lock_in_sync: bool,
    pub snapshot_exists: bool,
}

impl InstallDecision {
    /// Strategies to try when there is no snapshot
    pub fn plan(&self) -> Vec<InstallStrategy> {
        select_plan(self.lock_file_present, self.lock_in_sync)
    }
}

/// Current project state, read fresh from disk
#[derive(Debug, Clone)]
pub struct Assessment {
    pub project_name: String,
    pub fingerprint: Fingerprint,
    pub artifact_path: PathBuf,
    pub decision: InstallDecision,
}

/// Advisory messages raised during a run
#[derive(Debug, Clone, Default)]
pub struct Warnings(Vec<String>);

impl Warnings {
    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// How a successful run populated the dependency directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Restored {
        artifact: PathBuf,
    },
    Installed {
        strategy: InstallStrategy,
        artifact: PathBuf,
        /// `None` when the snapshot could not be saved
        saved: Option<SaveOutcome>,
    },
}

#[derive(Debug)]
pub struct RunReport {
    pub outcome: Outcome,
    pub warnings: Warnings,
}

impl RunReport {
    pub fn warned(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Drives one install run against a project
pub struct Orchestrator {
    options: InstallOptions,
    store: SnapshotStore,
    package_manager: Box<dyn PackageManager>,
    probe: Box<dyn SpaceProbe>,
    ui: UiContext,
}

impl Orchestrator {
    pub fn new(
        options: InstallOptions,
        store: SnapshotStore,
        package_manager: Box<dyn PackageManager>,
        probe: Box<dyn SpaceProbe>,
        ui: UiContext,
    ) -> Self {
        Self {
            options,
            store,
            package_manager,
            probe,
            ui,
        }
    }

    pub fn options(&self) -> &InstallOptions {
        &self.options
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Read the manifest and lock file and locate the matching snapshot.
    ///
    /// A missing or invalid manifest and an invalid lock file are fatal.
    pub async fn assess(&self) -> QuickResult<Assessment> {
        let manifest = PackageManifest::read(&self.options.manifest_path()).await?;
        let lock = PackageLock::read(&self.options.lock_path()).await?;

        let project_name = manifest.artifact_name();
        let fingerprint = compute_fingerprint(&self.options.sources()).await?;
        let artifact_path = self.artifact_path(&project_name, fingerprint.clone());

        let decision = InstallDecision {
            lock_file_present: lock.is_some(),
            lock_in_sync: lock.as_ref().is_some_and(|l| in_sync(&manifest, l)),
            snapshot_exists: self.store.exists(&artifact_path),
        };
        debug!("Install decision: {:?}", decision);

        Ok(Assessment {
            project_name,
            fingerprint,
            artifact_path,
            decision,
        })
    }

    /// Populate the dependency directory, from a snapshot when one exists
    pub async fn run(&self) -> QuickResult<RunReport> {
        let mut warnings = Warnings::default();

        let assessment = self.assess().await?;
        ui::step_info(
            &self.ui,
            &format!("Fingerprint of the dependency inputs: {}", assessment.fingerprint),
        );

        self.check_capacity(&mut warnings).await;
        self.check_lock(&assessment.decision, &mut warnings)?;

        let outcome = if assessment.decision.snapshot_exists {
            self.restore(&assessment.artifact_path).await?
        } else {
            self.install(&assessment, &mut warnings).await?
        };

        Ok(RunReport { outcome, warnings })
    }

    fn artifact_path(&self, project_name: &str, fingerprint: Fingerprint) -> PathBuf {
        self.store
            .artifact_path(&SnapshotArtifact::new(project_name, fingerprint))
    }

    fn warn(&self, warnings: &mut Warnings, message: String) {
        ui::warning_box(&self.ui, &message);
        warnings.push(message);
    }

    /// Report archive size and free space; only runs once the archive exists
    async fn check_capacity(&self, warnings: &mut Warnings) {
        let archive_dir = self.store.archive_dir();
        if !archive_dir.is_dir() {
            debug!("No archive directory yet at {}", archive_dir.display());
            return;
        }
        let dependency_dir = &self.options.files.dependency_dir;

        match self.probe.used_space(archive_dir).await {
            Some(bytes) => ui::step_info(
                &self.ui,
                &format!(
                    "The size occupied by the {} archive directory is {}",
                    dependency_dir,
                    format_bytes(bytes)
                ),
            ),
            None => self.warn(
                warnings,
                format!(
                    "Warning: The size occupied by the {} archive directory is NOT AVAILABLE",
                    dependency_dir
                ),
            ),
        }

        match self.probe.free_space(archive_dir).await {
            Some(bytes) if bytes < self.options.disk_warning_threshold => self.warn(
                warnings,
                format!(
                    "Warning: The available disk space for the partition containing the {} archive directory is {}",
                    dependency_dir,
                    format_bytes(bytes)
                ),
            ),
            Some(bytes) => ui::step_info(
                &self.ui,
                &format!(
                    "The available disk space for the partition containing the {} archive directory is {}",
                    dependency_dir,
                    format_bytes(bytes)
                ),
            ),
            None => self.warn(
                warnings,
                format!(
                    "Warning: Could not get the free disk space for the partition containing the {} archive directory",
                    dependency_dir
                ),
            ),
        }
    }

    /// Apply the strict-mode flags to the lock file state
    fn check_lock(&self, decision: &InstallDecision, warnings: &mut Warnings) -> QuickResult<()> {
        let files = &self.options.files;

        if !decision.lock_file_present {
            if self.options.require_lockfile {
                return Err(QuickError::LockfileMissing(self.options.lock_path()));
            }
            debug!("No {} in {}", files.lock_file, self.options.project_root.display());
            return Ok(());
        }

        if !decision.lock_in_sync {
            if self.options.require_lockfile_in_sync {
                return Err(QuickError::LockfileOutOfSync {
                    lockfile: files.lock_file.clone(),
                    manifest: files.manifest_file.clone(),
                });
            }
            self.warn(
                warnings,
                format!(
                    "Warning: Your {} is out of sync with {}",
                    files.lock_file, files.manifest_file
                ),
            );
        }
        Ok(())
    }

    async fn restore(&self, artifact_path: &Path) -> QuickResult<Outcome> {
        let target = self.options.dependency_dir();
        let mut spinner = TaskSpinner::new(&self.ui);
        spinner.start(&format!(
            "Restoring {} from {}",
            self.options.files.dependency_dir,
            artifact_path.display()
        ));

        match self.store.restore(artifact_path, &target).await {
            Ok(()) => {
                spinner.stop(&format!("Restored {}", target.display()));
                Ok(Outcome::Restored {
                    artifact: artifact_path.to_path_buf(),
                })
            }
            Err(e) => {
                spinner.stop_error("Restore failed");
                Err(e)
            }
        }
    }

    async fn install(&self, assessment: &Assessment, warnings: &mut Warnings) -> QuickResult<Outcome> {
        let plan = assessment.decision.plan();
        let root = &self.options.project_root;
        let name = self.package_manager.name().to_string();

        let mut succeeded = None;
        for strategy in &plan {
            let command = format!("{} {}", name, strategy.args().join(" "));
            match self.package_manager.install(*strategy, root).await {
                Ok(0) => {
                    info!("{} install succeeded", strategy);
                    succeeded = Some(*strategy);
                    break;
                }
                Ok(code) => self.warn(
                    warnings,
                    format!("Warning: \"$ {}\" command failed (exit code {})", command, code),
                ),
                Err(e) => {
                    debug!("{}", e);
                    self.warn(
                        warnings,
                        format!("Warning: \"$ {}\" command could not be started", command),
                    );
                }
            }
        }

        let Some(strategy) = succeeded else {
            return Err(QuickError::InstallFailed {
                package_manager: name,
                attempts: plan.len(),
            });
        };

        let artifact_path = if strategy.rewrites_lockfile() {
            // the package manager may have rewritten the lock file
            let fingerprint = compute_fingerprint(&self.options.sources()).await?;
            if fingerprint != assessment.fingerprint {
                info!(
                    "Fingerprint changed from {} to {} after install",
                    assessment.fingerprint, fingerprint
                );
            }
            self.artifact_path(&assessment.project_name, fingerprint)
        } else {
            assessment.artifact_path.clone()
        };

        let saved = self.save(&artifact_path, warnings).await;

        Ok(Outcome::Installed {
            strategy,
            artifact: artifact_path,
            saved,
        })
    }

    async fn save(&self, artifact_path: &Path, warnings: &mut Warnings) -> Option<SaveOutcome> {
        let mut spinner = TaskSpinner::new(&self.ui);
        spinner.start(&format!("Saving snapshot {}", artifact_path.display()));

        match self
            .store
            .save(artifact_path, &self.options.dependency_dir())
            .await
        {
            Ok(outcome) => {
                match outcome {
                    SaveOutcome::Created => spinner.stop("Snapshot saved"),
                    SaveOutcome::AlreadyCached => spinner.stop("Snapshot already cached"),
                }
                Some(outcome)
            }
            Err(e) => {
                spinner.stop_error("Snapshot not saved");
                debug!("{}", e);
                self.warn(
                    warnings,
                    format!(
                        "Warning: Could not back up the {} contents",
                        self.options.files.dependency_dir
                    ),
                );
                None
            }
        }
    }
}
