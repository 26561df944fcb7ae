//! Configuration management for npm-install-quick

pub mod schema;

pub use schema::Config;

use crate::error::{QuickError, QuickResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Name of the project-local override file
pub const LOCAL_CONFIG_FILE: &str = ".npm-install-quick.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("npm-install-quick")
            .join("config.toml")
    }

    /// Find the nearest project-local config file, walking up from `start`
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(LOCAL_CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration, falling back to defaults if the file does not exist
    pub async fn load(&self) -> QuickResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> QuickResult<Config> {
        let content = read_toml(path).await?;
        content
            .try_into()
            .map_err(|e: toml::de::Error| QuickError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Load the global configuration with a project-local file layered on top
    pub async fn load_merged(&self, local: Option<&Path>) -> QuickResult<Config> {
        let Some(local) = local else {
            return self.load().await;
        };

        let mut base = if self.config_path.exists() {
            read_toml(&self.config_path).await?
        } else {
            toml::Value::Table(toml::map::Map::new())
        };
        let overlay = read_toml(local).await?;
        merge_toml(&mut base, overlay);
        debug!("Merged local config from {}", local.display());

        base.try_into()
            .map_err(|e: toml::de::Error| QuickError::ConfigInvalid {
                path: local.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> QuickResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            QuickError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> QuickResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| QuickError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_toml(path: &Path) -> QuickResult<toml::Value> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| QuickError::io(format!("reading config from {}", path.display()), e))?;

    content
        .parse()
        .map_err(|e: toml::de::Error| QuickError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Recursively overlay `overlay` onto `base`; tables merge, everything else replaces.
fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
