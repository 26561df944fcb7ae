//! Archive tool abstraction
//!
//! Compression is delegated to the system `tar` and `gzip` binaries.

use crate::error::{QuickError, QuickResult};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::debug;

/// Creates and extracts compressed archives
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Archive `base/entry` into `archive`, storing paths relative to `base`
    async fn create(&self, base: &Path, entry: &str, archive: &Path) -> QuickResult<()>;

    /// Extract `archive` into the existing directory `dest`
    async fn extract(&self, archive: &Path, dest: &Path) -> QuickResult<()>;
}

/// `tar cf - <entry> | gzip -<level>` for saving, `tar -xzf` for restoring
pub struct TarArchiver {
    compression_level: u32,
    compressor: String,
}

impl TarArchiver {
    pub fn new(compression_level: u32) -> Self {
        Self {
            compression_level: compression_level.clamp(1, 9),
            compressor: "gzip".to_string(),
        }
    }

    /// Use another gzip-compatible program for compression
    pub fn with_compressor(mut self, program: impl Into<String>) -> Self {
        self.compressor = program.into();
        self
    }

    /// Stop and reap a `tar` whose output will never be consumed
    async fn abandon(tar: &mut Child) {
        if let Err(e) = tar.start_kill() {
            debug!("tar already exited: {}", e);
        }
        if let Err(e) = tar.wait().await {
            debug!("Could not reap tar: {}", e);
        }
    }
}

impl Default for TarArchiver {
    fn default() -> Self {
        Self::new(6)
    }
}

#[async_trait]
impl Archiver for TarArchiver {
    async fn create(&self, base: &Path, entry: &str, archive: &Path) -> QuickResult<()> {
        let level = format!("-{}", self.compression_level);
        debug!(
            "Executing: tar cf - {} | {} {} > {}",
            entry,
            self.compressor,
            level,
            archive.display()
        );

        let output = tokio::fs::File::create(archive)
            .await
            .map_err(|e| QuickError::io(format!("creating {}", archive.display()), e))?
            .into_std()
            .await;

        let mut tar = Command::new("tar")
            .args(["cf", "-", entry])
            .current_dir(base)
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| QuickError::command_failed("tar cf", e))?;

        let tar_stdout: Stdio = match tar.stdout.take().map(TryInto::<Stdio>::try_into) {
            Some(Ok(stdout)) => stdout,
            Some(Err(e)) => {
                Self::abandon(&mut tar).await;
                return Err(QuickError::io("piping tar into gzip", e));
            }
            None => {
                Self::abandon(&mut tar).await;
                return Err(QuickError::User("tar stdout was not captured".to_string()));
            }
        };

        let spawned = Command::new(&self.compressor)
            .args([level.as_str(), "-"])
            .stdin(tar_stdout)
            .stdout(Stdio::from(output))
            .spawn();
        let mut gzip = match spawned {
            Ok(child) => child,
            Err(e) => {
                Self::abandon(&mut tar).await;
                return Err(QuickError::command_failed(&self.compressor, e));
            }
        };

        let tar_status = tar
            .wait()
            .await
            .map_err(|e| QuickError::command_failed("tar cf", e))?;
        let gzip_status = gzip
            .wait()
            .await
            .map_err(|e| QuickError::command_failed(&self.compressor, e))?;

        if !tar_status.success() {
            return Err(QuickError::command_status(
                "tar cf",
                tar_status.code().unwrap_or(-1),
            ));
        }
        if !gzip_status.success() {
            return Err(QuickError::command_status(
                &self.compressor,
                gzip_status.code().unwrap_or(-1),
            ));
        }
        Ok(())
    }

    async fn extract(&self, archive: &Path, dest: &Path) -> QuickResult<()> {
        debug!(
            "Executing: tar -xzf {} --directory {}",
            archive.display(),
            dest.display()
        );

        let status = Command::new("tar")
            .arg("-xzf")
            .arg(archive)
            .arg("--directory")
            .arg(dest)
            .status()
            .await
            .map_err(|e| QuickError::command_failed("tar -xzf", e))?;

        if status.success() {
            Ok(())
        } else {
            Err(QuickError::command_status(
                "tar -xzf",
                status.code().unwrap_or(-1),
            ))
        }
    }
}
