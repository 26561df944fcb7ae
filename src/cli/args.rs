//! CLI argument definitions using clap derive

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// npm-install-quick - fast npm installs from fingerprinted snapshots
///
/// Restores node_modules from a snapshot when the manifest, lock file,
/// .npmrc and Node.js version are unchanged; otherwise installs with
/// npm and saves a new snapshot.
#[derive(Parser, Debug)]
#[command(name = "npm-install-quick")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute (defaults to install)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Options for the default install command
    #[command(flatten)]
    pub install: InstallArgs,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "NPM_INSTALL_QUICK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .npm-install-quick.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

impl Cli {
    /// The subcommand to run, with bare invocations meaning install
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Install(self.install))
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Restore node_modules from a snapshot, or install and snapshot it
    Install(InstallArgs),

    /// Print the fingerprint of the current dependency inputs
    Fingerprint(FingerprintArgs),

    /// Show lock file state and whether a snapshot exists
    Status(ProjectArgs),

    /// List stored snapshots
    List(ListArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

/// Project and archive selection shared by every project-aware command
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project directory (defaults to the nearest ancestor with a package.json)
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Directory holding snapshot archives
    #[arg(long, env = "NPM_INSTALL_QUICK_ARCHIVE_DIR")]
    pub archive_dir: Option<PathBuf>,
}

/// Arguments for the install command
#[derive(Args, Debug, Clone, Default)]
pub struct InstallArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Fail when package-lock.json is missing
    #[arg(long)]
    pub must_have_package_lock: bool,

    /// Fail when package-lock.json exists but is out of sync with package.json
    #[arg(long)]
    pub package_lock_must_be_in_sync_when_available: bool,
}

/// Arguments for the fingerprint command
#[derive(Args, Debug)]
pub struct FingerprintArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Print JSON instead of plain text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Show snapshots of every project in the archive directory
    #[arg(short, long)]
    pub all: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., cache.archive_dir)
        key: String,
        /// Value to set
        value: String,
        /// Write to project-local .npm-install-quick.toml instead of global config
        #[arg(long)]
        local: bool,
    },
}

/// Output format for list command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
