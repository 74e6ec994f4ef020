//! Command-line interface definition.
//!
//! - `blockpack plan` - Resolve the build plan and print it as JSON
//! - `blockpack check` - Resolve both modes and report configuration errors
//! - `blockpack build` - Run the bundler, then the post-emit plugins
//! - `blockpack dev` - Hand a development plan to the dev-server command
//! - `blockpack schema` - Print the JSON Schema for `blockpack.config.json`

mod commands;
mod validation;

use clap::Parser;

pub use commands::{
    BuildArgs, CheckArgs, Command, DevArgs, PlanArgs, ProjectArgs, SchemaArgs,
};
pub use validation::{parse_command, parse_port};

/// blockpack - build plans for embeddable UI blocks
#[derive(Parser, Debug)]
#[command(
    name = "blockpack",
    version,
    about = "Resolve and run build plans for embeddable UI blocks",
    long_about = "blockpack turns a block project's declared paths and peer dependencies into a\n\
                  validated build plan, hands it to an external bundler or dev server, and\n\
                  writes the manifest, index page and build metadata around its output."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::PathBuf;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_plan_flags() {
        let cli = Cli::parse_from(["blockpack", "plan", "--production", "--out", "plan.json"]);
        match cli.command {
            Command::Plan(args) => {
                assert!(args.production);
                assert_eq!(args.out, Some(PathBuf::from("plan.json")));
                assert_eq!(args.mode_argv(), vec!["plan", "--production"]);
            }
            other => panic!("expected plan, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_modes_conflict() {
        let result = Cli::try_parse_from(["blockpack", "plan", "--production", "--development"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_dev_port_validation() {
        assert!(Cli::try_parse_from(["blockpack", "dev", "--port", "0"]).is_err());
        let cli = Cli::parse_from(["blockpack", "dev", "--port", "3000"]);
        match cli.command {
            Command::Dev(args) => {
                assert_eq!(args.port, Some(3000));
                assert_eq!(args.mode_argv(), vec!["dev"]);
            }
            other => panic!("expected dev, got {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["blockpack", "check", "--verbose", "--cwd", "block"]);
        assert!(cli.verbose);
        match cli.command {
            Command::Check(args) => assert_eq!(args.project.cwd, Some(PathBuf::from("block"))),
            other => panic!("expected check, got {other:?}"),
        }
    }
}
