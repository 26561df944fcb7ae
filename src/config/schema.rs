//! Configuration schema for npm-install-quick
//!
//! Global configuration is stored at `~/.config/npm-install-quick/config.toml`.
//! A project may carry a `.npm-install-quick.toml` that overrides it key by key.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Snapshot archive settings
    pub cache: CacheConfig,

    /// Installation behaviour
    pub install: InstallConfig,

    /// Project file names
    pub project: ProjectConfig,

    /// JavaScript runtime settings
    pub runtime: RuntimeConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Snapshot archive configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding snapshot archives (relative paths resolve against the project root)
    pub archive_dir: PathBuf,

    /// Warn when the archive partition has less free space than this many GB
    pub disk_warning_below_gb: u32,

    /// gzip compression level used when saving snapshots (1-9)
    pub compression_level: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            archive_dir: PathBuf::from("/var/tmp/npm-install-quick/archive"),
            disk_warning_below_gb: 10,
            compression_level: 6,
        }
    }
}

impl CacheConfig {
    /// Resolve the archive directory for a project
    pub fn archive_dir_for(&self, project_root: &Path) -> PathBuf {
        if self.archive_dir.is_absolute() {
            self.archive_dir.clone()
        } else {
            project_root.join(&self.archive_dir)
        }
    }

    /// Free-space warning threshold in bytes
    pub fn disk_warning_threshold(&self) -> u64 {
        u64::from(self.disk_warning_below_gb) * 1024 * 1024 * 1024
    }
}

/// Installation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Package manager executable
    pub package_manager: String,

    /// Fail when the lock file is missing
    pub require_lockfile: bool,

    /// Fail when the lock file exists but does not satisfy the manifest
    pub require_lockfile_in_sync: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            package_manager: "npm".to_string(),
            require_lockfile: false,
            require_lockfile_in_sync: false,
        }
    }
}

/// File names inside a project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub manifest_file: String,
    pub lock_file: String,
    pub env_config_file: String,
    pub dependency_dir: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            manifest_file: "package.json".to_string(),
            lock_file: "package-lock.json".to_string(),
            env_config_file: ".npmrc".to_string(),
            dependency_dir: "node_modules".to_string(),
        }
    }
}

/// JavaScript runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Executable queried with `--version`
    pub command: String,

    /// Fixed runtime version, skips the probe when set
    pub version: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command: "node".to_string(),
            version: None,
        }
    }
}
