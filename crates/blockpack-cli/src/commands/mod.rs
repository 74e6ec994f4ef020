//! Command implementations for the blockpack CLI.
//!
//! - [`plan`] - Resolve and print the build plan
//! - [`check`] - Validate configuration for both modes
//! - [`build`] - Run the bundler and the post-emit plugins
//! - [`dev`] - Hand a development plan to the dev-server command
//! - [`schema`] - Print the config file's JSON Schema
//!
//! Each command provides an `execute` function taking its parsed arguments.

pub mod build;
pub mod check;
pub mod dev;
pub mod plan;
pub mod schema;
pub(crate) mod utils;

pub use build::execute as build_execute;
pub use check::execute as check_execute;
pub use dev::execute as dev_execute;
pub use plan::execute as plan_execute;
pub use schema::execute as schema_execute;
