//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager, LOCAL_CONFIG_FILE};
use crate::error::{QuickError, QuickResult};
use crate::ui::{self, UiContext};
use std::path::PathBuf;
use tokio::fs;

/// Every key `config set` accepts
const VALID_KEYS: [&str; 13] = [
    "general.log_format",
    "cache.archive_dir",
    "cache.disk_warning_below_gb",
    "cache.compression_level",
    "install.package_manager",
    "install.require_lockfile",
    "install.require_lockfile_in_sync",
    "project.manifest_file",
    "project.lock_file",
    "project.env_config_file",
    "project.dependency_dir",
    "runtime.command",
    "runtime.version",
];

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> QuickResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value, local }) => {
            if local {
                set_local_value(&key, &value).await?
            } else {
                set_value(manager, &key, &value).await?
            }
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> QuickResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> QuickResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_info(
            &ctx,
            &format!(
                "Config already exists at {} (use --force to overwrite)",
                path.display()
            ),
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok(
        &ctx,
        &format!("Configuration initialized at {}", path.display()),
    );

    Ok(())
}

/// Update one key of the global config file, leaving project overrides out
async fn set_value(manager: &ConfigManager, key: &str, value: &str) -> QuickResult<()> {
    let ctx = UiContext::detect();
    let mut config = manager.load().await?;

    let parts: Vec<&str> = key.split('.').collect();
    match parts.as_slice() {
        ["general", "log_format"] => config.general.log_format = parse_log_format(value)?,

        ["cache", "archive_dir"] => config.cache.archive_dir = PathBuf::from(value),
        ["cache", "disk_warning_below_gb"] => config.cache.disk_warning_below_gb = parse_u32(value)?,
        ["cache", "compression_level"] => config.cache.compression_level = parse_level(value)?,

        ["install", "package_manager"] => config.install.package_manager = value.to_string(),
        ["install", "require_lockfile"] => config.install.require_lockfile = parse_bool(value)?,
        ["install", "require_lockfile_in_sync"] => {
            config.install.require_lockfile_in_sync = parse_bool(value)?
        }

        ["project", "manifest_file"] => config.project.manifest_file = value.to_string(),
        ["project", "lock_file"] => config.project.lock_file = value.to_string(),
        ["project", "env_config_file"] => config.project.env_config_file = value.to_string(),
        ["project", "dependency_dir"] => config.project.dependency_dir = value.to_string(),

        ["runtime", "command"] => config.runtime.command = value.to_string(),
        ["runtime", "version"] => {
            config.runtime.version = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        }

        _ => {
            ui::step_error_detail(&ctx, "Unknown config key", key);
            print_valid_keys();
            return Err(QuickError::User(format!("Unknown config key: {}", key)));
        }
    }

    manager.save(&config).await?;
    ui::step_ok(&ctx, &format!("Set {} = {}", key, value));

    Ok(())
}

async fn set_local_value(key: &str, value: &str) -> QuickResult<()> {
    let ctx = UiContext::detect();

    let cwd =
        std::env::current_dir().map_err(|e| QuickError::io("getting current directory", e))?;
    let local_path = cwd.join(LOCAL_CONFIG_FILE);

    validate_config_key(key)?;

    let mut doc: toml::Value = if local_path.exists() {
        let content = fs::read_to_string(&local_path)
            .await
            .map_err(|e| QuickError::io(format!("reading {}", local_path.display()), e))?;
        content
            .parse()
            .map_err(|e: toml::de::Error| QuickError::ConfigInvalid {
                path: local_path.clone(),
                reason: e.to_string(),
            })?
    } else {
        toml::Value::Table(toml::map::Map::new())
    };

    set_toml_value(&mut doc, key, value)?;

    // Only the keys the user set explicitly are written back
    let content = toml::to_string_pretty(&doc)?;
    fs::write(&local_path, content)
        .await
        .map_err(|e| QuickError::io(format!("writing {}", local_path.display()), e))?;

    ui::step_ok(
        &ctx,
        &format!("Set {} = {} in {}", key, value, local_path.display()),
    );

    Ok(())
}

fn validate_config_key(key: &str) -> QuickResult<()> {
    if VALID_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(QuickError::User(format!("Unknown config key: {}", key)))
    }
}

/// Set a dot-separated key in a TOML value tree, creating intermediate tables as needed
fn set_toml_value(doc: &mut toml::Value, key: &str, value: &str) -> QuickResult<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((leaf, parents)) = parts.split_last() else {
        return Err(QuickError::User("Empty config key".to_string()));
    };

    let mut current = doc;
    for &part in parents {
        current = current
            .as_table_mut()
            .ok_or_else(|| QuickError::User(format!("Expected table at key: {}", part)))?
            .entry(part)
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    let table = current
        .as_table_mut()
        .ok_or_else(|| QuickError::User(format!("Expected table for key: {}", key)))?;

    let toml_value = if let Ok(flag) = value.parse::<bool>() {
        toml::Value::Boolean(flag)
    } else if let Ok(n) = value.parse::<i64>() {
        toml::Value::Integer(n)
    } else {
        toml::Value::String(value.to_string())
    };

    table.insert((*leaf).to_string(), toml_value);
    Ok(())
}

fn parse_bool(value: &str) -> QuickResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(QuickError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_u32(value: &str) -> QuickResult<u32> {
    value
        .parse()
        .map_err(|_| QuickError::User(format!("Invalid number: {}", value)))
}

fn parse_level(value: &str) -> QuickResult<u32> {
    match parse_u32(value)? {
        level @ 1..=9 => Ok(level),
        _ => Err(QuickError::User(format!(
            "Invalid compression level: {}. Use 1-9",
            value
        ))),
    }
}

fn parse_log_format(value: &str) -> QuickResult<String> {
    match value {
        "text" | "json" => Ok(value.to_string()),
        _ => Err(QuickError::User(format!(
            "Invalid log format: {}. Use text or json",
            value
        ))),
    }
}

fn print_valid_keys() {
    eprintln!("Valid keys:");
    for key in VALID_KEYS {
        eprintln!("  {}", key);
    }
}
