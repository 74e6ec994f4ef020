//! Plan command implementation.
//!
//! Resolves the build plan and prints it as JSON, or writes it with `--out`.

use blockpack_config::resolve_invocation;
use tracing::debug;

use crate::cli::PlanArgs;
use crate::commands::utils::{self, Project};
use crate::config::CliOverrides;
use crate::emit::writer;
use crate::error::Result;
use crate::ui;

/// Execute the plan command.
pub async fn execute(args: PlanArgs) -> Result<()> {
    let project = Project::load(&args.project, &CliOverrides::default())?;
    let inputs = project.resolve_inputs()?;

    let (decision, plan) = resolve_invocation(&args.mode_argv(), &project.env, &inputs)?;
    debug!(reason = ?decision.reason, "mode decided");
    let json = plan.to_json_pretty()?;

    match &args.out {
        Some(out) => {
            let path = utils::resolve_path(out, &utils::get_cwd()?);
            writer::write_file(&path, json.as_bytes())?;
            ui::success(&format!("{} plan written to {}", plan.mode(), path.display()));
        }
        None => println!("{json}"),
    }

    Ok(())
}
