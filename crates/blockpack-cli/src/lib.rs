//! blockpack CLI - resolves build plans for embeddable UI blocks and drives
//! the external bundler.
//!
//! The resolution itself lives in `blockpack-config`; this crate is the host
//! around it:
//!
//! - [`config`] - `blockpack.config.json` loading and merging
//! - [`bundler`] - the external bundler / dev-server boundary
//! - [`emit`] - post-emit plugins (static copy, manifest, index page, metadata)
//! - [`error`] - error types and miette conversion
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - terminal status lines and summaries
//!
//! # Example
//!
//! ```rust,no_run
//! use blockpack_cli::{config::{CliOverrides, ProjectConfig}, error::Result};
//! use std::collections::HashMap;
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let dir = Path::new(".");
//!     let config = ProjectConfig::load(dir, None, &CliOverrides::default())?;
//!     let inputs = config.resolve_inputs(dir, &HashMap::new())?;
//!     let plan = blockpack_config::resolve_plan(blockpack_config::BuildMode::Production, &inputs)?;
//!     println!("{}", plan.to_json_pretty()?);
//!     Ok(())
//! }
//! ```

pub mod bundler;
pub mod cli;
pub mod commands;
pub mod config;
pub mod emit;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ProjectConfigError, Result, ResultExt};
