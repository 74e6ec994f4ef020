//! Shared utilities for command implementations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use blockpack_config::{BuildPlan, ResolveInputs};
use tracing::debug;

use crate::cli::ProjectArgs;
use crate::config::{CliOverrides, ProjectConfig};
use crate::emit::{writer, WORK_DIR};
use crate::error::{CliError, Result};

/// File name of the plan handed to the external tools.
pub const PLAN_FILE: &str = "plan.json";

/// Get the current working directory.
pub fn get_cwd() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| {
        CliError::Custom(format!("Failed to determine current working directory: {e}"))
    })
}

/// Resolve a path relative to a working directory.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Snapshot of the process environment; the engine never reads it itself.
pub fn process_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// A loaded project: its directory, merged configuration and environment.
#[derive(Debug)]
pub struct Project {
    pub dir: PathBuf,
    pub config: ProjectConfig,
    pub env: HashMap<String, String>,
}

impl Project {
    /// Load configuration for the project selected by `args`.
    pub fn load(args: &ProjectArgs, overrides: &CliOverrides) -> Result<Self> {
        let cwd = get_cwd()?;
        let dir = match &args.cwd {
            Some(dir) => resolve_path(dir, &cwd),
            None => cwd,
        };
        if !dir.is_dir() {
            return Err(CliError::FileNotFound(dir));
        }

        let config = ProjectConfig::load(&dir, args.config.as_deref(), overrides)?;
        debug!(dir = %dir.display(), "project configuration loaded");

        Ok(Self {
            dir,
            config,
            env: process_env(),
        })
    }

    pub fn resolve_inputs(&self) -> Result<ResolveInputs> {
        self.config.resolve_inputs(&self.dir, &self.env)
    }
}

/// Write `plan` to `<output>/.blockpack/plan.json` and return the path.
pub fn write_plan(plan: &BuildPlan) -> Result<PathBuf> {
    let path = writer::output_path(plan.output_dir(), &Path::new(WORK_DIR).join(PLAN_FILE))?;
    writer::write_file(&path, plan.to_json_pretty()?.as_bytes())?;
    debug!(path = %path.display(), "plan written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path_absolute() {
        let abs = if cfg!(windows) {
            Path::new("C:\\project\\src")
        } else {
            Path::new("/project/src")
        };
        assert_eq!(resolve_path(abs, Path::new("/other")), abs);
    }

    #[test]
    fn test_resolve_path_relative() {
        assert_eq!(
            resolve_path(Path::new("site"), Path::new("/work")),
            Path::new("/work").join("site")
        );
    }
}
