use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::validation::{parse_command, parse_port};

/// Available blockpack subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the build plan and print it as JSON
    ///
    /// Without a mode flag the mode follows NODE_ENV and BLOCKPACK_MODE,
    /// defaulting to development.
    Plan(PlanArgs),

    /// Validate configuration for both modes
    ///
    /// Resolves the production and development plans and reports the first
    /// configuration error of each.
    Check(CheckArgs),

    /// Build the block
    ///
    /// Writes the plan to <outputDir>/.blockpack/plan.json, runs the bundler
    /// command with BLOCKPACK_PLAN pointing at it, then writes the static copy,
    /// manifest, index page and build metadata.
    Build(BuildArgs),

    /// Start the development server
    ///
    /// Resolves a development plan and hands it to the dev-server command.
    Dev(DevArgs),

    /// Print the JSON Schema for blockpack.config.json
    Schema(SchemaArgs),
}

/// Options shared by every command that reads a project
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Path to blockpack.config.json
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project directory (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Resolve the production (library) plan
    #[arg(long, conflicts_with = "development")]
    pub production: bool,

    /// Resolve the development (harness) plan
    #[arg(long)]
    pub development: bool,

    /// Write the plan to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub project: ProjectArgs,
}

impl PlanArgs {
    /// Arguments as seen by mode detection.
    pub fn mode_argv(&self) -> Vec<String> {
        let mut argv = vec!["plan".to_string()];
        if self.production {
            argv.push("--production".to_string());
        }
        if self.development {
            argv.push("--development".to_string());
        }
        argv
    }
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Build the production (library) bundle
    #[arg(long)]
    pub production: bool,

    /// Bundler command line; overrides `bundlerCommand` from the config
    ///
    /// Example: --bundler "npx webpack --config webpack.blockpack.js"
    #[arg(long, value_name = "CMD", value_parser = parse_command)]
    pub bundler: Option<String>,

    #[command(flatten)]
    pub project: ProjectArgs,
}

impl BuildArgs {
    /// Arguments as seen by mode detection.
    pub fn mode_argv(&self) -> Vec<String> {
        let mut argv = vec!["build".to_string()];
        if self.production {
            argv.push("--production".to_string());
        }
        argv
    }
}

/// Arguments for the dev command
#[derive(Args, Debug)]
pub struct DevArgs {
    /// Port for the dev server; overrides `devServerPort`
    #[arg(short, long, value_parser = parse_port)]
    pub port: Option<u16>,

    /// Dev-server command line; overrides `devServerCommand` from the config
    #[arg(long, value_name = "CMD", value_parser = parse_command)]
    pub bundler: Option<String>,

    #[command(flatten)]
    pub project: ProjectArgs,
}

impl DevArgs {
    /// Arguments as seen by mode detection.
    pub fn mode_argv(&self) -> Vec<String> {
        vec!["dev".to_string()]
    }
}

/// Arguments for the schema command
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Write the schema to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}
