//! Stakeholder inputs of a dependency tree
//!
//! A stakeholder is anything whose content changes what the package manager
//! would put into the dependency directory:
//!
//! - declared dependencies and devDependencies of the manifest
//! - resolved entries and format markers of the lock file
//! - the environment config file (`.npmrc`) verbatim
//! - the runtime version
//!
//! The package manager's own version and lifecycle scripts are deliberately
//! not stakeholders.

use crate::error::{QuickError, QuickResult};
use crate::manifest::read_json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Where the stakeholder inputs of a project live
#[derive(Debug, Clone)]
pub struct StakeholderSources {
    pub manifest: PathBuf,
    pub lock_file: PathBuf,
    pub env_config: PathBuf,
    pub runtime_version: Option<String>,
}

impl StakeholderSources {
    /// Sources for the conventional file names under `project_root`
    pub fn in_project(project_root: &Path, runtime_version: Option<String>) -> Self {
        Self {
            manifest: project_root.join("package.json"),
            lock_file: project_root.join("package-lock.json"),
            env_config: project_root.join(".npmrc"),
            runtime_version,
        }
    }
}

/// Manifest fields that shape the dependency tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestStakes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Value>,

    #[serde(
        default,
        rename = "devDependencies",
        skip_serializing_if = "Option::is_none"
    )]
    pub dev_dependencies: Option<Value>,
}

/// Lock file fields that shape the dependency tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LockStakes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Value>,

    /// Only kept when `dependencies` is absent; v2 lock files carry both
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Value>,

    #[serde(
        default,
        rename = "lockfileVersion",
        skip_serializing_if = "Option::is_none"
    )]
    pub lockfile_version: Option<Value>,

    #[serde(
        default,
        rename = "packageIntegrity",
        skip_serializing_if = "Option::is_none"
    )]
    pub package_integrity: Option<Value>,
}

impl LockStakes {
    /// Drop `packages` when `dependencies` already lists the locked tree.
    ///
    /// `packages[""]` holds the project's own name and version, which must not
    /// affect the fingerprint.
    fn normalized(mut self) -> Self {
        if self.dependencies.is_some() {
            self.packages = None;
        }
        self
    }
}

/// Everything the fingerprint is derived from.
///
/// Absent inputs are left out entirely rather than serialized as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StakeholderSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<ManifestStakes>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock: Option<LockStakes>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_config: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_version: Option<String>,
}

impl StakeholderSet {
    /// Read every stakeholder from disk.
    ///
    /// Each input is optional on its own: a missing or unreadable file simply
    /// drops out of the set.
    pub async fn load(sources: &StakeholderSources) -> Self {
        let manifest = load_optional::<ManifestStakes>(&sources.manifest).await;
        let lock = load_optional::<LockStakes>(&sources.lock_file)
            .await
            .map(LockStakes::normalized);

        let env_config = match fs::read(&sources.env_config).await {
            Ok(bytes) if !bytes.is_empty() => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Ok(_) => None,
            Err(e) => {
                debug!("No env config at {}: {}", sources.env_config.display(), e);
                None
            }
        };

        let runtime_version = sources
            .runtime_version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Self {
            manifest,
            lock,
            env_config,
            runtime_version,
        }
    }

    /// Canonical JSON (RFC 8785): object keys sorted at every depth, no whitespace
    pub fn canonical_bytes(&self) -> QuickResult<Vec<u8>> {
        serde_json_canonicalizer::to_vec(self).map_err(|e| QuickError::Canonicalize(e.to_string()))
    }
}

async fn load_optional<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    match read_json(path).await {
        Ok(found) => found,
        Err(reason) => {
            debug!("Ignoring unreadable {}: {}", path.display(), reason);
            None
        }
    }
}
