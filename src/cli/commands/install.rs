//! Install command - restore or install node_modules

use crate::cli::args::InstallArgs;
use crate::cli::project;
use crate::config::Config;
use crate::error::QuickResult;
use crate::install::Outcome;
use crate::ui::{self, UiContext};
use tracing::debug;

/// Execute the install command
pub async fn execute(args: InstallArgs, config: &Config) -> QuickResult<()> {
    let mut config = config.clone();
    config.install.require_lockfile |= args.must_have_package_lock;
    config.install.require_lockfile_in_sync |= args.package_lock_must_be_in_sync_when_available;

    let ctx = UiContext::detect();
    let orchestrator = project::orchestrator(&args.project, &config, &ctx).await?;
    debug!(
        "Project {} with archive {}",
        orchestrator.options().project_root.display(),
        orchestrator.store().archive_dir().display()
    );

    ui::intro(&ctx, "npm-install-quick");
    let report = orchestrator.run().await?;

    match &report.outcome {
        Outcome::Restored { artifact } => ui::step_ok(
            &ctx,
            &format!(
                "{} restored from {}",
                config.project.dependency_dir,
                artifact.display()
            ),
        ),
        Outcome::Installed { strategy, .. } => ui::step_ok(
            &ctx,
            &format!("{} installed ({} install)", config.project.dependency_dir, strategy),
        ),
    }

    ui::outro_success(&ctx, report.warned());
    Ok(())
}
