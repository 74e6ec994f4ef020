//! Build command implementation.
//!
//! Resolves the plan, hands it to the bundler command, then runs the plan's
//! plugins over whatever the bundler emitted.

use std::time::Instant;

use blockpack_config::resolve_invocation;
use tracing::debug;

use crate::bundler::{Bundler, BundlerRequest, CommandBundler};
use crate::cli::BuildArgs;
use crate::commands::utils::{self, Project};
use crate::config::CliOverrides;
use crate::emit;
use crate::error::Result;
use crate::ui;

/// Execute the build command.
///
/// # Build Process
///
/// 1. Load configuration (CLI > Env > File > Defaults)
/// 2. Decide the mode and resolve the plan
/// 3. Write the plan to `<outputDir>/.blockpack/plan.json`
/// 4. Run the bundler command, if one is configured
/// 5. Run the post-emit plugins in plan order
/// 6. Display the emitted files
pub async fn execute(args: BuildArgs) -> Result<()> {
    let start_time = Instant::now();

    ui::info("Loading configuration...");
    let overrides = CliOverrides {
        bundler_command: args.bundler.clone(),
        ..CliOverrides::default()
    };
    let project = Project::load(&args.project, &overrides)?;
    let inputs = project.resolve_inputs()?;

    let (decision, plan) = resolve_invocation(&args.mode_argv(), &project.env, &inputs)?;
    debug!(reason = ?decision.reason, "mode decided");
    ui::print_plan_summary(&plan);

    let plan_file = utils::write_plan(&plan)?;

    match project.config.bundler_command.as_deref() {
        Some(command) => {
            let bundler = CommandBundler::parse(command)?;
            ui::info(&format!("Running {}...", bundler.name()));
            bundler
                .run(BundlerRequest {
                    plan: &plan,
                    plan_file: &plan_file,
                    project_dir: &project.dir,
                })
                .await?;
        }
        None => ui::warning("No bundler command configured; using existing output"),
    }

    let report = emit::run_plugins(&plan)?;
    debug!(
        copied = report.copied.len(),
        generated = report.generated.len(),
        "post-emit plugins finished"
    );

    ui::print_artifact_summary(&report.artifacts.summary(), start_time.elapsed());
    ui::success(&format!(
        "{} build completed in {}",
        plan.mode(),
        ui::format_duration(start_time.elapsed())
    ));

    Ok(())
}
