//! Check command implementation.
//!
//! Resolves the plan for both modes without running anything.

use blockpack_config::{resolve_plan, BuildMode};

use crate::cli::CheckArgs;
use crate::commands::utils::Project;
use crate::config::CliOverrides;
use crate::error::{CliError, Result};
use crate::ui;

/// Execute the check command.
///
/// Each mode is resolved independently so one broken mode does not hide the
/// other's error. The first error of each mode is reported.
pub async fn execute(args: CheckArgs) -> Result<()> {
    ui::info("Checking configuration...");
    let project = Project::load(&args.project, &CliOverrides::default())?;
    let inputs = project.resolve_inputs()?;
    ui::success("Configuration loaded");

    let mut failed = Vec::new();
    for mode in [BuildMode::Production, BuildMode::Development] {
        match resolve_plan(mode, &inputs) {
            Ok(plan) => ui::success(&format!(
                "{mode}: {} plugins, {} externals",
                plan.plugins().len(),
                plan.externals().len()
            )),
            Err(err) => {
                ui::error(&format!("{mode}: {err}"));
                failed.push(mode);
            }
        }
    }

    if failed.is_empty() {
        ui::success("All checks passed!");
        Ok(())
    } else {
        let modes: Vec<&str> = failed.iter().map(|mode| mode.as_str()).collect();
        Err(CliError::Custom(format!(
            "Check failed for {}",
            modes.join(" and ")
        )))
    }
}
