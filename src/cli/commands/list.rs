//! List command - show stored snapshots

use crate::cli::args::{ListArgs, OutputFormat};
use crate::cli::project;
use crate::config::Config;
use crate::disk::format_bytes;
use crate::error::QuickResult;
use crate::manifest::PackageManifest;
use crate::snapshot::{SnapshotStore, StoredSnapshot, TarArchiver};
use crate::ui::{self, UiContext};
use console::style;

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> QuickResult<()> {
    let root = project::project_root(&args.project, config)?;
    let store = SnapshotStore::new(
        project::archive_dir(&args.project, config, &root),
        Box::new(TarArchiver::new(config.cache.compression_level)),
    );

    let project_name = if args.all {
        None
    } else {
        let manifest = PackageManifest::read(&root.join(&config.project.manifest_file)).await?;
        Some(manifest.artifact_name())
    };
    let snapshots = store.list(project_name.as_deref()).await?;

    if snapshots.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(
                    &ctx,
                    &format!("No snapshots in {}", store.archive_dir().display()),
                );
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&snapshots),
        OutputFormat::Json => print_json(&snapshots)?,
        OutputFormat::Plain => print_plain(&snapshots),
    }

    Ok(())
}

fn print_table(snapshots: &[StoredSnapshot]) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Snapshots");

    println!(
        "{:<30} {:<18} {:<10} {:<17}",
        style("PROJECT").bold(),
        style("FINGERPRINT").bold(),
        style("SIZE").bold(),
        style("MODIFIED").bold()
    );
    println!("{}", "-".repeat(78));

    let mut total = 0u64;
    for snapshot in snapshots {
        let modified = snapshot
            .modified
            .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let project = if snapshot.project_name.is_empty() {
            "(unnamed)"
        } else {
            snapshot.project_name.as_str()
        };
        total += snapshot.size_bytes;

        println!(
            "{:<30} {:<18} {:<10} {:<17}",
            project,
            snapshot.fingerprint,
            format_bytes(snapshot.size_bytes),
            modified
        );
    }

    println!();
    println!("{} snapshot(s), {}", snapshots.len(), format_bytes(total));
}

fn print_json(snapshots: &[StoredSnapshot]) -> QuickResult<()> {
    let json = serde_json::to_string_pretty(snapshots)?;
    println!("{}", json);
    Ok(())
}

fn print_plain(snapshots: &[StoredSnapshot]) {
    for snapshot in snapshots {
        println!("{}", snapshot.path.display());
    }
}
