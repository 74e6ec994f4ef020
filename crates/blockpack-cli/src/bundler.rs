//! The external bundler / dev-server boundary.
//!
//! blockpack never bundles anything itself. It writes the resolved plan to
//! disk and runs a user-supplied command with `BLOCKPACK_PLAN` pointing at
//! that file. A failing command is reported verbatim and never retried.

use std::path::Path;
use std::process::Stdio;

use blockpack_config::BuildPlan;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{CliError, Result};

/// Environment variable carrying the plan file path to the external command.
pub const PLAN_ENV_VAR: &str = "BLOCKPACK_PLAN";

/// What the external tool is asked to do.
#[derive(Debug, Clone, Copy)]
pub struct BundlerRequest<'a> {
    pub plan: &'a BuildPlan,
    pub plan_file: &'a Path,
    pub project_dir: &'a Path,
}

/// Something that consumes a build plan: a one-shot bundler or a dev server.
pub trait Bundler {
    fn name(&self) -> &str;

    async fn run(&self, request: BundlerRequest<'_>) -> Result<()>;
}

/// Runs an external command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBundler {
    program: String,
    args: Vec<String>,
    capture_stderr: bool,
}

impl CommandBundler {
    /// Split a command line into program and arguments.
    ///
    /// Whitespace separates words except inside single or double quotes.
    /// A backslash escapes the next character outside single quotes.
    pub fn parse(command: &str) -> Result<Self> {
        let mut parts = split_command(command)?.into_iter();
        let program = parts
            .next()
            .ok_or_else(|| CliError::InvalidArgument("bundler command is empty".to_string()))?;

        Ok(Self {
            program,
            args: parts.collect(),
            capture_stderr: true,
        })
    }

    /// Let the command write to the terminal directly (long-running servers).
    pub fn interactive(mut self) -> Self {
        self.capture_stderr = false;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Shell-style word splitting without expansion.
fn split_command(command: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote_char: Option<char> = None;
    let mut chars = command.chars();

    while let Some(ch) = chars.next() {
        match (quote_char, ch) {
            (Some('\''), '\'') => quote_char = None,
            (Some('"'), '"') => quote_char = None,
            (Some('\''), _) => current.push(ch),
            (_, '\\') => {
                let escaped = chars.next().ok_or_else(|| {
                    CliError::InvalidArgument(format!("command ends with a backslash: {command}"))
                })?;
                current.push(escaped);
                in_word = true;
            }
            (Some(_), _) => current.push(ch),
            (None, '\'' | '"') => {
                quote_char = Some(ch);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, _) => {
                current.push(ch);
                in_word = true;
            }
        }
    }

    if let Some(quote) = quote_char {
        return Err(CliError::InvalidArgument(format!(
            "unterminated {quote} quote in command: {command}"
        )));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

impl Bundler for CommandBundler {
    fn name(&self) -> &str {
        &self.program
    }

    async fn run(&self, request: BundlerRequest<'_>) -> Result<()> {
        info!(command = %self.program, plan = %request.plan_file.display(), "running external command");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(request.project_dir)
            .env(PLAN_ENV_VAR, request.plan_file)
            .env("NODE_ENV", &request.plan.environment().node_env)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(if self.capture_stderr {
                Stdio::piped()
            } else {
                Stdio::inherit()
            });

        let child = cmd.spawn().map_err(|e| CliError::ExternalTool {
            tool: self.program.clone(),
            status: None,
            stderr: format!("failed to start: {e}"),
        })?;

        let output = child.wait_with_output().await?;
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(CliError::ExternalTool {
                tool: self.program.clone(),
                status: output.status.code(),
                stderr,
            });
        }

        // Warnings printed by a successful run are still the user's to see
        if !stderr.is_empty() {
            eprint!("{stderr}");
        }
        debug!(command = %self.program, "external command finished");
        Ok(())
    }
}
