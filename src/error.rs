//! Error types for npm-install-quick
//!
//! All modules use `QuickResult<T>` as their return type. Only fatal
//! conditions become errors; advisory failures are collected as warnings
//! by the install orchestrator and never surface here.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for npm-install-quick operations
pub type QuickResult<T> = Result<T, QuickError>;

/// All fatal errors that can end a run
#[derive(Error, Debug)]
pub enum QuickError {
    // Project input errors
    #[error("{0} does not exist")]
    ManifestMissing(PathBuf),

    #[error("{path} is not valid: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    #[error("{0} file is missing")]
    LockfileMissing(PathBuf),

    #[error("{path} is not valid: {reason}")]
    LockfileInvalid { path: PathBuf, reason: String },

    #[error("{lockfile} is not in sync with {manifest}")]
    LockfileOutOfSync { lockfile: String, manifest: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Snapshot errors
    #[error("Could not restore snapshot {artifact} ({step}): {reason}")]
    RestoreFailed {
        artifact: PathBuf,
        step: String,
        reason: String,
    },

    #[error("Could not save snapshot {artifact}: {reason}")]
    SnapshotSave { artifact: PathBuf, reason: String },

    #[error("Could not serialize stakeholders: {0}")]
    Canonicalize(String),

    // Install errors
    #[error("Could not run {package_manager} installation ({attempts} attempt(s) failed)")]
    InstallFailed {
        package_manager: String,
        attempts: usize,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command exited unsuccessfully: {command} (exit code {code})")]
    CommandStatus { command: String, code: i32 },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    User(String),
}

impl QuickError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error (the process could not be spawned)
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command status error (the process ran and exited non-zero)
    pub fn command_status(command: impl Into<String>, code: i32) -> Self {
        Self::CommandStatus {
            command: command.into(),
            code,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ManifestMissing(_) => Some("Run from inside a project that has a package.json"),
            Self::LockfileMissing(_) => Some("Run: npm install --package-lock-only"),
            Self::LockfileOutOfSync { .. } => {
                Some("Run: npm install, then commit the updated package-lock.json")
            }
            Self::RestoreFailed { .. } => {
                Some("Remove the snapshot file and run again to reinstall from scratch")
            }
            Self::InstallFailed { .. } => Some("Check the package manager output above"),
            _ => None,
        }
    }
}
