//! Status command - show what the next install would do

use crate::cli::args::ProjectArgs;
use crate::cli::project;
use crate::config::Config;
use crate::disk::{format_bytes, SpaceProbe, SystemProbe};
use crate::error::QuickResult;
use crate::ui::{self, UiContext};

/// Execute the status command
pub async fn execute(args: ProjectArgs, config: &Config) -> QuickResult<()> {
    let ctx = UiContext::detect();
    let orchestrator = project::orchestrator(&args, config, &ctx).await?;
    let options = orchestrator.options();
    let assessment = orchestrator.assess().await?;
    let decision = assessment.decision;

    ui::intro(&ctx, "npm-install-quick status");

    ui::key_value(&ctx, "Project", &options.project_root.display().to_string());
    let name = if assessment.project_name.is_empty() {
        "(unnamed)"
    } else {
        assessment.project_name.as_str()
    };
    ui::key_value(&ctx, "Name", name);
    ui::key_value(
        &ctx,
        "Runtime",
        options.runtime_version.as_deref().unwrap_or("unknown"),
    );
    ui::key_value(&ctx, "Fingerprint", assessment.fingerprint.as_str());

    let (lock_state, lock_ok) = match (decision.lock_file_present, decision.lock_in_sync) {
        (false, _) => ("missing", false),
        (true, true) => ("in sync", true),
        (true, false) => ("out of sync", false),
    };
    ui::key_value_status(&ctx, &config.project.lock_file, lock_state, lock_ok);

    let snapshot_state = if decision.snapshot_exists {
        "cached"
    } else {
        "not cached"
    };
    ui::key_value_status(&ctx, "Snapshot", snapshot_state, decision.snapshot_exists);
    ui::key_value(&ctx, "Artifact", &assessment.artifact_path.display().to_string());

    let next = if decision.snapshot_exists {
        "restore snapshot".to_string()
    } else {
        let plan: Vec<String> = decision
            .plan()
            .iter()
            .map(|s| format!("{} {}", config.install.package_manager, s.args().join(" ")))
            .collect();
        plan.join(", then ")
    };
    ui::key_value(&ctx, "Next install", &next);

    let archive_dir = orchestrator.store().archive_dir();
    if archive_dir.is_dir() {
        let probe = SystemProbe;
        let used = probe.used_space(archive_dir).await;
        let free = probe.free_space(archive_dir).await;
        ui::key_value(
            &ctx,
            "Archive size",
            &used.map(format_bytes).unwrap_or_else(|| "unavailable".to_string()),
        );
        let free_ok = free.is_some_and(|bytes| bytes >= options.disk_warning_threshold);
        ui::key_value_status(
            &ctx,
            "Free space",
            &free.map(format_bytes).unwrap_or_else(|| "unavailable".to_string()),
            free_ok,
        );
    } else {
        ui::key_value(&ctx, "Archive", "not created yet");
    }

    Ok(())
}
