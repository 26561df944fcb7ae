//! npm-install-quick
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use npm_install_quick::cli::{Cli, Commands};
use npm_install_quick::config::{Config, ConfigManager};
use npm_install_quick::error::{QuickError, QuickResult};
use npm_install_quick::ui::{self, UiContext};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ui::outro_failure(&UiContext::detect());
            ExitCode::FAILURE
        }
    }
}

async fn run() -> QuickResult<()> {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    // Completions don't need config loading
    if let Some(Commands::Completions { shell }) = &cli.command {
        npm_install_quick::cli::commands::completions(*shell);
        return Ok(());
    }

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    // Find local config unless --no-local is set
    let local_config_path = if cli.no_local {
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| QuickError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    init_logging(verbose, &config);
    if let Some(ref path) = local_config_path {
        debug!("Found local config: {}", path.display());
    }

    match cli.into_command() {
        Commands::Install(args) => npm_install_quick::cli::commands::install(args, &config).await,
        Commands::Fingerprint(args) => {
            npm_install_quick::cli::commands::fingerprint(args, &config).await
        }
        Commands::Status(args) => npm_install_quick::cli::commands::status(args, &config).await,
        Commands::List(args) => npm_install_quick::cli::commands::list(args, &config).await,
        Commands::Config(args) => {
            npm_install_quick::cli::commands::config(args, &config, &config_manager).await
        }
        Commands::Completions { .. } => Ok(()),
    }
}

/// 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("npm_install_quick=warn"),
        1 => EnvFilter::new("npm_install_quick=info"),
        _ => EnvFilter::new("npm_install_quick=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
