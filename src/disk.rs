//! Disk capacity probing
//!
//! Sizes come from the POSIX `df -Pk` and `du -sk` tools. A probe that fails
//! or prints something unexpected yields `None`; callers turn that into a
//! warning, never an error.

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Narrow interface to OS space queries
#[async_trait]
pub trait SpaceProbe: Send + Sync {
    /// Free bytes on the partition holding `path`
    async fn free_space(&self, path: &Path) -> Option<u64>;

    /// Bytes occupied by `path` and everything below it
    async fn used_space(&self, path: &Path) -> Option<u64>;
}

/// Probe backed by `df` and `du`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

#[async_trait]
impl SpaceProbe for SystemProbe {
    async fn free_space(&self, path: &Path) -> Option<u64> {
        let stdout = capture("df", &["-Pk"], path).await?;
        parse_df_available(&stdout)
    }

    async fn used_space(&self, path: &Path) -> Option<u64> {
        let stdout = capture("du", &["-sk"], path).await?;
        parse_du_total(&stdout)
    }
}

async fn capture(program: &str, args: &[&str], path: &Path) -> Option<String> {
    debug!("Executing: {} {:?} {}", program, args, path.display());

    let output = Command::new(program)
        .args(args)
        .arg(path)
        .output()
        .await
        .map_err(|e| debug!("{} could not be started: {}", program, e))
        .ok()?;

    if !output.status.success() {
        debug!("{} exited with {:?}", program, output.status.code());
        return None;
    }
    String::from_utf8(output.stdout).ok()
}

/// Available bytes from the last line of `df -Pk` output
fn parse_df_available(stdout: &str) -> Option<u64> {
    let line = stdout.lines().rev().find(|l| !l.trim().is_empty())?;
    // Filesystem 1024-blocks Used Available Capacity Mounted-on
    let available: u64 = line.split_whitespace().nth(3)?.parse().ok()?;
    available.checked_mul(1024)
}

/// Total bytes from `du -sk` output (`<kb>\t<path>`)
fn parse_du_total(stdout: &str) -> Option<u64> {
    let kilobytes: u64 = stdout.split_whitespace().next()?.parse().ok()?;
    kilobytes.checked_mul(1024)
}

/// Format bytes as human-readable size (e.g., "1.5 GB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else if bytes == 1 {
        "1 byte".to_string()
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn df_output_parsed() {
        let out = "Filesystem     1024-blocks      Used Available Capacity Mounted on\n\
                   /dev/sda1        102400000  51200000  40960000      56% /\n";
        assert_eq!(parse_df_available(out), Some(40_960_000 * 1024));
    }

    #[test]
    fn df_garbage_is_unavailable() {
        assert_eq!(parse_df_available(""), None);
        assert_eq!(parse_df_available("df: /nope: No such file or directory\n"), None);
    }

    #[test]
    fn du_output_parsed() {
        assert_eq!(parse_du_total("2048\t/var/tmp/archive\n"), Some(2048 * 1024));
        assert_eq!(parse_du_total("du: cannot access"), None);
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(0), "0 bytes");
        assert_eq!(format_bytes(1), "1 byte");
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(10 * 1024 * 1024 * 1024), "10.0 GB");
    }

    #[tokio::test]
    async fn system_probe_reports_for_existing_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("f"), vec![0u8; 4096]).unwrap();

        let probe = SystemProbe;
        assert!(probe.free_space(dir.path()).await.is_some());
        assert!(probe.used_space(dir.path()).await.is_some());
    }

    #[tokio::test]
    async fn system_probe_missing_path_is_unavailable() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        assert_eq!(SystemProbe.used_space(&missing).await, None);
    }
}
