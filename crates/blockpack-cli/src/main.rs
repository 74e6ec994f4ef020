//! blockpack CLI entry point: argument parsing, logging setup and command
//! dispatch.

use blockpack_cli::{cli, commands, error, logger, ui};
use clap::Parser;
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    if args.no_color {
        ui::disable_colors();
    } else {
        ui::init_colors();
    }

    let result = match args.command {
        cli::Command::Plan(plan_args) => commands::plan_execute(plan_args).await,
        cli::Command::Check(check_args) => commands::check_execute(check_args).await,
        cli::Command::Build(build_args) => commands::build_execute(build_args).await,
        cli::Command::Dev(dev_args) => commands::dev_execute(dev_args).await,
        cli::Command::Schema(schema_args) => commands::schema_execute(schema_args).await,
    };

    result.map_err(error::cli_error_to_miette)
}
