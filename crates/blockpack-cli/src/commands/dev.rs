//! Dev command implementation.
//!
//! blockpack does not serve anything itself: it resolves a development plan
//! and runs the configured dev-server command against it until that exits.

use blockpack_config::{resolve_invocation, BuildMode, ConfigError};
use tracing::debug;

use crate::bundler::{Bundler, BundlerRequest, CommandBundler};
use crate::cli::DevArgs;
use crate::commands::utils::{self, Project};
use crate::config::CliOverrides;
use crate::error::{CliError, Result};
use crate::ui;

/// Execute the dev command.
///
/// An explicit production override (`BLOCKPACK_MODE=production`) is rejected
/// rather than serving a library build.
pub async fn execute(args: DevArgs) -> Result<()> {
    let overrides = CliOverrides {
        dev_server_port: args.port,
        dev_server_command: args.bundler.clone(),
        ..CliOverrides::default()
    };
    let project = Project::load(&args.project, &overrides)?;
    let inputs = project.resolve_inputs()?;

    let (decision, plan) = resolve_invocation(&args.mode_argv(), &project.env, &inputs)?;
    debug!(reason = ?decision.reason, "mode decided");
    if plan.mode() != BuildMode::Development {
        return Err(ConfigError::PlanContract {
            mode: plan.mode(),
            reason: "the dev server only runs development plans".to_string(),
        }
        .into());
    }
    ui::print_plan_summary(&plan);

    let plan_file = utils::write_plan(&plan)?;

    let Some(command) = project.config.dev_server_command.as_deref() else {
        return Err(CliError::InvalidArgument(format!(
            "No dev-server command configured; plan written to {}\n\n\
             Hint: Set 'devServerCommand' in blockpack.config.json or pass --bundler",
            plan_file.display()
        )));
    };

    let server = CommandBundler::parse(command)?.interactive();
    if let Some(config) = plan.dev_server() {
        ui::info(&format!(
            "Starting {} on port {}...",
            server.name(),
            config.port
        ));
    }

    server
        .run(BundlerRequest {
            plan: &plan,
            plan_file: &plan_file,
            project_dir: &project.dir,
        })
        .await
}
