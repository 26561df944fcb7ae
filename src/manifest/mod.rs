//! Package manifest and lock file models
//!
//! Every read goes to disk. Nothing here caches parsed contents, so a lock
//! file rewritten by the package manager earlier in the same run is always
//! seen in its current state.

pub mod range;
pub mod sync;

pub use sync::{all_satisfied, version_satisfies};

use crate::error::{QuickError, QuickResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Prefix of top-level entries in the `packages` section of v2/v3 lock files
const PACKAGES_PREFIX: &str = "node_modules/";

/// The subset of `package.json` this tool cares about
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Read and parse the manifest, treating absence and malformed JSON as fatal
    pub async fn read(path: &Path) -> QuickResult<Self> {
        match read_json(path).await {
            Ok(Some(manifest)) => Ok(manifest),
            Ok(None) => Err(QuickError::ManifestMissing(path.to_path_buf())),
            Err(reason) => Err(QuickError::ManifestInvalid {
                path: path.to_path_buf(),
                reason,
            }),
        }
    }

    /// Project name usable in a file name: scoped names lose their slash
    pub fn artifact_name(&self) -> String {
        self.name.as_deref().unwrap_or_default().replace('/', "-")
    }
}

/// One resolved entry of a lock file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LockedDependency {
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub integrity: Option<String>,
}

impl LockedDependency {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
            integrity: None,
        }
    }
}

/// The subset of `package-lock.json` used for sync checks
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageLock {
    #[serde(default, rename = "lockfileVersion")]
    pub lockfile_version: Option<u32>,

    #[serde(default)]
    pub dependencies: BTreeMap<String, LockedDependency>,

    #[serde(default)]
    pub packages: BTreeMap<String, LockedDependency>,
}

impl PackageLock {
    /// Read the lock file. `Ok(None)` means the file does not exist.
    pub async fn read(path: &Path) -> QuickResult<Option<Self>> {
        read_json(path).await.map_err(|reason| QuickError::LockfileInvalid {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Locked versions keyed by top-level package name.
    ///
    /// v1 lock files list them under `dependencies`; v3 lock files only have
    /// `packages`, keyed by install path.
    pub fn locked(&self) -> BTreeMap<String, LockedDependency> {
        if !self.dependencies.is_empty() {
            return self.dependencies.clone();
        }

        self.packages
            .iter()
            .filter_map(|(key, entry)| {
                let name = key.strip_prefix(PACKAGES_PREFIX)?;
                // nested installs look like node_modules/a/node_modules/b
                if name.contains("/node_modules/") {
                    return None;
                }
                Some((name.to_string(), entry.clone()))
            })
            .collect()
    }
}

/// Whether the manifest's declared ranges are all satisfied by the lock file
pub fn in_sync(manifest: &PackageManifest, lock: &PackageLock) -> bool {
    let locked = lock.locked();
    all_satisfied(&manifest.dependencies, &locked)
        && all_satisfied(&manifest.dev_dependencies, &locked)
}

/// Read a JSON file from disk.
///
/// Returns `Ok(None)` when the file does not exist and `Err(reason)` when it
/// exists but cannot be read or parsed.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, String> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.to_string()),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn manifest_missing_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = PackageManifest::read(&dir.path().join("package.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, QuickError::ManifestMissing(_)));
    }

    #[tokio::test]
    async fn manifest_invalid_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = PackageManifest::read(&path).await.unwrap_err();
        assert!(matches!(err, QuickError::ManifestInvalid { .. }));
    }

    #[test]
    fn scoped_name_is_flattened() {
        let manifest = PackageManifest {
            name: Some("@acme/web-app".to_string()),
            ..PackageManifest::default()
        };
        assert_eq!(manifest.artifact_name(), "@acme-web-app");
        assert_eq!(PackageManifest::default().artifact_name(), "");
    }

    #[tokio::test]
    async fn lock_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let lock = PackageLock::read(&dir.path().join("package-lock.json"))
            .await
            .unwrap();
        assert!(lock.is_none());
    }

    #[test]
    fn lock_v1_uses_dependencies() {
        let lock: PackageLock = serde_json::from_str(
            r#"{
                "lockfileVersion": 1,
                "dependencies": {
                    "left-pad": { "version": "1.3.0", "integrity": "sha512-abc" }
                }
            }"#,
        )
        .unwrap();

        let locked = lock.locked();
        assert_eq!(locked["left-pad"].version.as_deref(), Some("1.3.0"));
        assert_eq!(locked["left-pad"].integrity.as_deref(), Some("sha512-abc"));
    }

    #[test]
    fn lock_v3_falls_back_to_top_level_packages() {
        let lock: PackageLock = serde_json::from_str(
            r#"{
                "lockfileVersion": 3,
                "packages": {
                    "": { "name": "app", "version": "1.0.0" },
                    "node_modules/react": { "version": "18.2.0" },
                    "node_modules/@types/node": { "version": "20.1.0" },
                    "node_modules/react/node_modules/loose-envify": { "version": "1.4.0" }
                }
            }"#,
        )
        .unwrap();

        let locked = lock.locked();
        assert_eq!(locked.len(), 2);
        assert_eq!(locked["react"].version.as_deref(), Some("18.2.0"));
        assert_eq!(locked["@types/node"].version.as_deref(), Some("20.1.0"));
    }

    #[test]
    fn in_sync_checks_both_dependency_sets() {
        let manifest: PackageManifest = serde_json::from_str(
            r#"{
                "dependencies": { "a": "^1.0.0" },
                "devDependencies": { "b": "~2.1.0" }
            }"#,
        )
        .unwrap();
        let synced: PackageLock = serde_json::from_str(
            r#"{ "dependencies": { "a": { "version": "1.4.0" }, "b": { "version": "2.1.9" } } }"#,
        )
        .unwrap();
        let stale: PackageLock = serde_json::from_str(
            r#"{ "dependencies": { "a": { "version": "1.4.0" }, "b": { "version": "2.2.0" } } }"#,
        )
        .unwrap();

        assert!(in_sync(&manifest, &synced));
        assert!(!in_sync(&manifest, &stale));
    }
}
