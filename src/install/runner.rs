//! Package manager and runtime invocation

use crate::error::{QuickError, QuickResult};
use crate::install::strategy::InstallStrategy;
use crate::ui::{self, UiContext};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Something that can populate the dependency directory
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Run one install attempt in `project_root` and return its exit code.
    ///
    /// `Err` means the process could not be started at all.
    async fn install(&self, strategy: InstallStrategy, project_root: &Path) -> QuickResult<i32>;

    /// Executable name for messages
    fn name(&self) -> &str;
}

/// npm (or a compatible executable) run as a child process with inherited stdio
pub struct NpmCommand {
    program: String,
    ui: UiContext,
}

impl NpmCommand {
    pub fn new(program: impl Into<String>, ui: UiContext) -> Self {
        Self {
            program: program.into(),
            ui,
        }
    }
}

#[async_trait]
impl PackageManager for NpmCommand {
    async fn install(&self, strategy: InstallStrategy, project_root: &Path) -> QuickResult<i32> {
        let args = strategy.args();
        ui::command_echo(&self.ui, project_root, &self.program, args);
        debug!("Executing interactively: {} {:?}", self.program, args);

        let status = Command::new(&self.program)
            .args(args)
            .current_dir(project_root)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| QuickError::command_failed(format!("{} {:?}", self.program, args), e))?;

        Ok(status.code().unwrap_or(-1))
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Ask the JavaScript runtime for its version (`v20.11.1` becomes `20.11.1`)
pub async fn probe_runtime_version(command: &str) -> Option<String> {
    debug!("Executing: {} --version", command);

    let output = Command::new(command)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|e| debug!("{} could not be started: {}", command, e))
        .ok()?;

    if !output.status.success() {
        return None;
    }
    parse_runtime_version(&String::from_utf8_lossy(&output.stdout))
}

fn parse_runtime_version(stdout: &str) -> Option<String> {
    let line = stdout.lines().next()?.trim();
    let version = line.strip_prefix('v').unwrap_or(line);
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}
