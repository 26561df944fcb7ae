//! Snapshot archive directory
//!
//! Artifacts are named `{project}-dependencies-{fingerprint}.tar.gz` and are
//! never rewritten: a different fingerprint always means a different file.
//! Old artifacts are kept; nothing here evicts.

use crate::error::{QuickError, QuickResult};
use crate::fingerprint::Fingerprint;
use crate::snapshot::archiver::Archiver;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// File extension of snapshot artifacts
pub const ARCHIVE_EXTENSION: &str = ".tar.gz";

/// Infix between project name and fingerprint
const NAME_INFIX: &str = "-dependencies-";

/// Identity of one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotArtifact {
    pub project_name: String,
    pub fingerprint: Fingerprint,
}

impl SnapshotArtifact {
    /// `project_name` may be a scoped package name; slashes are flattened
    pub fn new(project_name: &str, fingerprint: Fingerprint) -> Self {
        Self {
            project_name: project_name.replace('/', "-"),
            fingerprint,
        }
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}{}{}{}",
            self.project_name, NAME_INFIX, self.fingerprint, ARCHIVE_EXTENSION
        )
    }
}

/// What `save` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new artifact was written
    Created,
    /// An artifact for this fingerprint already existed and was left alone
    AlreadyCached,
}

/// A snapshot file found in the archive directory
#[derive(Debug, Clone, Serialize)]
pub struct StoredSnapshot {
    pub path: PathBuf,
    pub project_name: String,
    pub fingerprint: String,
    pub size_bytes: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Owns the archive directory and moves dependency trees in and out of it
pub struct SnapshotStore {
    archive_dir: PathBuf,
    archiver: Box<dyn Archiver>,
}

impl SnapshotStore {
    pub fn new(archive_dir: PathBuf, archiver: Box<dyn Archiver>) -> Self {
        Self {
            archive_dir,
            archiver,
        }
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Deterministic location of an artifact
    pub fn artifact_path(&self, artifact: &SnapshotArtifact) -> PathBuf {
        self.archive_dir.join(artifact.file_name())
    }

    pub fn exists(&self, artifact_path: &Path) -> bool {
        artifact_path.is_file()
    }

    /// Archive `source_dir` into `artifact_path`.
    ///
    /// An existing artifact is never overwritten. The archive is written to a
    /// temporary sibling and renamed into place, so a crash mid-write cannot
    /// leave a truncated file under the final name.
    pub async fn save(&self, artifact_path: &Path, source_dir: &Path) -> QuickResult<SaveOutcome> {
        if self.exists(artifact_path) {
            debug!("Snapshot already cached: {}", artifact_path.display());
            return Ok(SaveOutcome::AlreadyCached);
        }

        let save_error = |reason: String| QuickError::SnapshotSave {
            artifact: artifact_path.to_path_buf(),
            reason,
        };

        let parent = artifact_path
            .parent()
            .ok_or_else(|| save_error("artifact path has no parent directory".to_string()))?;
        fs::create_dir_all(parent)
            .await
            .map_err(|e| save_error(format!("creating {}: {}", parent.display(), e)))?;

        let (base, entry) = split_dir(source_dir).ok_or_else(|| {
            save_error(format!("{} is not a directory path", source_dir.display()))
        })?;
        if !source_dir.is_dir() {
            return Err(save_error(format!("{} does not exist", source_dir.display())));
        }

        let partial = partial_path(artifact_path);
        if let Err(e) = self.archiver.create(base, entry, &partial).await {
            remove_partial(&partial).await;
            return Err(save_error(e.to_string()));
        }

        if let Err(e) = fs::rename(&partial, artifact_path).await {
            remove_partial(&partial).await;
            return Err(save_error(format!("moving archive into place: {}", e)));
        }

        info!("Saved snapshot {}", artifact_path.display());
        Ok(SaveOutcome::Created)
    }

    /// Replace `target_dir` with the contents of `artifact_path`.
    ///
    /// Steps: extract into a fresh staging directory under the archive
    /// directory, delete `target_dir`, move the extracted tree into its place,
    /// delete the staging directory. Not crash-safe: an interruption between
    /// the delete and the move leaves no dependency directory at all.
    pub async fn restore(&self, artifact_path: &Path, target_dir: &Path) -> QuickResult<()> {
        let fail = |step: &str, reason: String| QuickError::RestoreFailed {
            artifact: artifact_path.to_path_buf(),
            step: step.to_string(),
            reason,
        };

        let (_, entry) = split_dir(target_dir).ok_or_else(|| {
            fail(
                "prepare",
                format!("{} is not a directory path", target_dir.display()),
            )
        })?;
        let staging = self.staging_dir(artifact_path);

        fs::create_dir_all(&staging)
            .await
            .map_err(|e| fail("create staging directory", e.to_string()))?;

        if let Err(e) = self.archiver.extract(artifact_path, &staging).await {
            remove_staging(&staging).await;
            return Err(fail("extract", e.to_string()));
        }

        let extracted = staging.join(entry);
        if !extracted.is_dir() {
            remove_staging(&staging).await;
            return Err(fail(
                "extract",
                format!("archive does not contain {}", entry),
            ));
        }

        if fs::symlink_metadata(target_dir).await.is_ok() {
            fs::remove_dir_all(target_dir)
                .await
                .map_err(|e| fail("remove existing dependencies", e.to_string()))?;
        }

        move_dir(&extracted, target_dir)
            .await
            .map_err(|e| fail("move into place", e.to_string()))?;

        fs::remove_dir_all(&staging)
            .await
            .map_err(|e| fail("remove staging directory", e.to_string()))?;

        info!(
            "Restored {} from {}",
            target_dir.display(),
            artifact_path.display()
        );
        Ok(())
    }

    /// Snapshots in the archive directory, optionally limited to one project
    pub async fn list(&self, project_name: Option<&str>) -> QuickResult<Vec<StoredSnapshot>> {
        if !self.archive_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.archive_dir).await.map_err(|e| {
            QuickError::io(format!("reading {}", self.archive_dir.display()), e)
        })?;

        let mut snapshots = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            QuickError::io(format!("reading {}", self.archive_dir.display()), e)
        })? {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let Some((name, fingerprint)) = parse_file_name(&file_name) else {
                continue;
            };
            if project_name.is_some_and(|wanted| wanted.replace('/', "-") != name) {
                continue;
            }

            let metadata = match entry.metadata().await {
                Ok(metadata) if metadata.is_file() => metadata,
                _ => continue,
            };
            snapshots.push(StoredSnapshot {
                path: entry.path(),
                project_name: name.to_string(),
                fingerprint: fingerprint.to_string(),
                size_bytes: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }

        snapshots.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(snapshots)
    }

    fn staging_dir(&self, artifact_path: &Path) -> PathBuf {
        let stem = artifact_path
            .file_name()
            .map(|n| n.to_string_lossy().trim_end_matches(ARCHIVE_EXTENSION).to_string())
            .unwrap_or_default();
        self.archive_dir.join(format!("{}-{}", stem, Uuid::new_v4()))
    }
}

/// Split `{project}-dependencies-{fingerprint}.tar.gz` into its two parts
fn parse_file_name(file_name: &str) -> Option<(&str, &str)> {
    let stem = file_name.strip_suffix(ARCHIVE_EXTENSION)?;
    let (name, fingerprint) = stem.rsplit_once(NAME_INFIX)?;
    if fingerprint.is_empty() || !fingerprint.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some((name, fingerprint))
}

fn split_dir(dir: &Path) -> Option<(&Path, &str)> {
    let entry = dir.file_name()?.to_str()?;
    let base = dir.parent().filter(|p| !p.as_os_str().is_empty())?;
    Some((base, entry))
}

fn partial_path(artifact_path: &Path) -> PathBuf {
    let mut name = artifact_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".partial-{}", Uuid::new_v4()));
    artifact_path.with_file_name(name)
}

async fn remove_partial(partial: &Path) {
    if let Err(e) = fs::remove_file(partial).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Could not remove {}: {}", partial.display(), e);
        }
    }
}

async fn remove_staging(staging: &Path) {
    if let Err(e) = fs::remove_dir_all(staging).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Could not remove {}: {}", staging.display(), e);
        }
    }
}

/// Rename, falling back to `mv` when source and target are on different filesystems
async fn move_dir(from: &Path, to: &Path) -> QuickResult<()> {
    match fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!("rename failed ({}), falling back to mv", e);
            let status = Command::new("mv")
                .arg(from)
                .arg(to)
                .status()
                .await
                .map_err(|e| QuickError::command_failed("mv", e))?;
            if status.success() {
                Ok(())
            } else {
                Err(QuickError::command_status("mv", status.code().unwrap_or(-1)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::StakeholderSet;
    use crate::snapshot::archiver::TarArchiver;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn fingerprint() -> Fingerprint {
        Fingerprint::of(&StakeholderSet::default()).unwrap()
    }

    fn store(dir: &Path) -> SnapshotStore {
        SnapshotStore::new(dir.join("archive"), Box::new(TarArchiver::default()))
    }

    fn populate(node_modules: &Path) {
        std::fs::create_dir_all(node_modules.join("left-pad/lib")).unwrap();
        std::fs::create_dir_all(node_modules.join(".bin")).unwrap();
        std::fs::write(node_modules.join("left-pad/package.json"), r#"{"version":"1.3.0"}"#)
            .unwrap();
        std::fs::write(node_modules.join("left-pad/lib/index.js"), "module.exports = pad;")
            .unwrap();
        std::fs::write(node_modules.join(".package-lock.json"), "{}").unwrap();
    }

    /// Relative path -> contents for every file under `root`
    fn tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
            for entry in std::fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    out.insert(path.strip_prefix(root).unwrap().to_path_buf(), Vec::new());
                    walk(root, &path, out);
                } else {
                    out.insert(
                        path.strip_prefix(root).unwrap().to_path_buf(),
                        std::fs::read(&path).unwrap(),
                    );
                }
            }
        }
        let mut out = BTreeMap::new();
        walk(root, root, &mut out);
        out
    }

    #[test]
    fn artifact_file_name() {
        let artifact = SnapshotArtifact::new("@acme/web", fingerprint());
        assert_eq!(
            artifact.file_name(),
            "@acme-web-dependencies-27c74670adb75075.tar.gz"
        );
    }

    #[test]
    fn parse_artifact_file_names() {
        assert_eq!(
            parse_file_name("my-app-dependencies-0123456789abcdef.tar.gz"),
            Some(("my-app", "0123456789abcdef"))
        );
        assert_eq!(
            parse_file_name("-dependencies-0123456789abcdef.tar.gz"),
            Some(("", "0123456789abcdef"))
        );
        assert_eq!(parse_file_name("my-app-dependencies-xyz.tar.gz"), None);
        assert_eq!(parse_file_name("notes.txt"), None);
    }

    #[tokio::test]
    async fn save_then_restore_roundtrip() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("project");
        let node_modules = project.join("node_modules");
        populate(&node_modules);
        let original = tree(&node_modules);

        let store = store(dir.path());
        let artifact = store.artifact_path(&SnapshotArtifact::new("app", fingerprint()));

        assert!(!store.exists(&artifact));
        let outcome = store.save(&artifact, &node_modules).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Created);
        assert!(store.exists(&artifact));

        // dirty the installed tree, restore must replace it wholesale
        std::fs::remove_file(node_modules.join("left-pad/lib/index.js")).unwrap();
        std::fs::write(node_modules.join("stray.js"), "oops").unwrap();

        store.restore(&artifact, &node_modules).await.unwrap();
        assert_eq!(tree(&node_modules), original);
    }

    #[tokio::test]
    async fn restore_into_missing_target() {
        let dir = TempDir::new().unwrap();
        let node_modules = dir.path().join("project/node_modules");
        populate(&node_modules);
        let original = tree(&node_modules);

        let store = store(dir.path());
        let artifact = store.artifact_path(&SnapshotArtifact::new("app", fingerprint()));
        store.save(&artifact, &node_modules).await.unwrap();

        std::fs::remove_dir_all(&node_modules).unwrap();
        store.restore(&artifact, &node_modules).await.unwrap();
        assert_eq!(tree(&node_modules), original);
    }

    #[tokio::test]
    async fn restore_cleans_up_staging() {
        let dir = TempDir::new().unwrap();
        let node_modules = dir.path().join("project/node_modules");
        populate(&node_modules);

        let store = store(dir.path());
        let artifact = store.artifact_path(&SnapshotArtifact::new("app", fingerprint()));
        store.save(&artifact, &node_modules).await.unwrap();
        store.restore(&artifact, &node_modules).await.unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(store.archive_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from(artifact.file_name().unwrap())]);
    }

    #[tokio::test]
    async fn save_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let node_modules = dir.path().join("project/node_modules");
        populate(&node_modules);

        let store = store(dir.path());
        let artifact = store.artifact_path(&SnapshotArtifact::new("app", fingerprint()));
        store.save(&artifact, &node_modules).await.unwrap();
        let first = std::fs::read(&artifact).unwrap();

        std::fs::write(node_modules.join("changed.js"), "new").unwrap();
        let outcome = store.save(&artifact, &node_modules).await.unwrap();

        assert_eq!(outcome, SaveOutcome::AlreadyCached);
        assert_eq!(std::fs::read(&artifact).unwrap(), first);
    }

    #[tokio::test]
    async fn failed_save_leaves_nothing_behind() {
        let dir = TempDir::new().unwrap();
        let store = store(dir.path());
        let artifact = store.artifact_path(&SnapshotArtifact::new("app", fingerprint()));

        let result = store
            .save(&artifact, &dir.path().join("project/node_modules"))
            .await;

        assert!(matches!(result, Err(QuickError::SnapshotSave { .. })));
        assert!(!store.exists(&artifact));
        let leftovers = std::fs::read_dir(store.archive_dir()).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn restore_of_corrupt_archive_is_fatal_and_keeps_target() {
        let dir = TempDir::new().unwrap();
        let node_modules = dir.path().join("project/node_modules");
        populate(&node_modules);

        let store = store(dir.path());
        let artifact = store.artifact_path(&SnapshotArtifact::new("app", fingerprint()));
        std::fs::create_dir_all(store.archive_dir()).unwrap();
        std::fs::write(&artifact, b"not an archive").unwrap();

        for _ in 0..3 {
            let err = store.restore(&artifact, &node_modules).await.unwrap_err();
            match err {
                QuickError::RestoreFailed { step, .. } => assert_eq!(step, "extract"),
                other => panic!("expected RestoreFailed, got {:?}", other),
            }
        }
        // extraction failed before the existing tree was touched
        assert!(node_modules.join("left-pad/lib/index.js").exists());

        let left: Vec<_> = std::fs::read_dir(store.archive_dir())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(left, vec![artifact]);
    }

    #[tokio::test]
    async fn restore_without_dependency_dir_in_archive_cleans_staging() {
        let dir = TempDir::new().unwrap();
        let other = dir.path().join("project/vendor");
        populate(&other);
        let node_modules = dir.path().join("project/node_modules");

        let store = store(dir.path());
        let artifact = store.artifact_path(&SnapshotArtifact::new("app", fingerprint()));
        store.save(&artifact, &other).await.unwrap();

        let err = store.restore(&artifact, &node_modules).await.unwrap_err();
        assert!(matches!(err, QuickError::RestoreFailed { .. }));
        assert!(!node_modules.exists());
        assert_eq!(std::fs::read_dir(store.archive_dir()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn list_filters_by_project() {
        let dir = TempDir::new().unwrap();
        let store = store(dir.path());
        std::fs::create_dir_all(store.archive_dir()).unwrap();
        for name in [
            "app-dependencies-0123456789abcdef.tar.gz",
            "app-dependencies-fedcba9876543210.tar.gz",
            "other-dependencies-0123456789abcdef.tar.gz",
            "README.txt",
        ] {
            std::fs::write(store.archive_dir().join(name), "x").unwrap();
        }

        let all = store.list(None).await.unwrap();
        assert_eq!(all.len(), 3);

        let app = store.list(Some("app")).await.unwrap();
        assert_eq!(app.len(), 2);
        assert!(app.iter().all(|s| s.project_name == "app" && s.size_bytes == 1));
    }

    #[tokio::test]
    async fn list_missing_archive_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(store(dir.path()).list(None).await.unwrap().is_empty());
    }
}
