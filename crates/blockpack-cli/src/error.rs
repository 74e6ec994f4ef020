//! Error handling for the blockpack CLI.
//!
//! - **Top-level errors** (`CliError`) represent broad categories of failures
//! - **Project config errors** (`ProjectConfigError`) cover `blockpack.config.json`
//! - **Resolution errors** are the engine's own [`blockpack_config::ConfigError`],
//!   carried unchanged so the offending field is reported verbatim
//!
//! # Example
//!
//! ```rust,no_run
//! use blockpack_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_template(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_path(path)
//!         .with_hint("Check the 'htmlTemplate' field")
//! }
//! ```

mod diagnostic;

use std::path::PathBuf;
use thiserror::Error;

pub use diagnostic::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading or validating `blockpack.config.json` failed
    #[error("Configuration error: {0}")]
    Config(#[from] ProjectConfigError),

    /// Build-plan resolution failed
    #[error("Resolution error: {0}")]
    Resolve(#[from] blockpack_config::ConfigError),

    /// The external bundler or dev-server command failed
    #[error("{tool} failed ({}){}", status_text(.status), stderr_text(.stderr))]
    ExternalTool {
        /// Command that was run
        tool: String,
        /// Exit code, if the process exited normally
        status: Option<i32>,
        /// Captured standard error, verbatim
        stderr: String,
    },

    /// A post-emit plugin could not produce its output
    #[error("Failed to emit {}: {message}", .path.display())]
    Emit {
        /// File being written
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

fn status_text(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

fn stderr_text(stderr: &str) -> String {
    let trimmed = stderr.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n\n{trimmed}")
    }
}

/// Errors loading the project configuration file.
#[derive(Debug, Error)]
pub enum ProjectConfigError {
    /// Config file doesn't exist at the requested location
    #[error("Config file not found: {}\n\nHint: Create a blockpack.config.json file or drop --config to use defaults", .0.display())]
    NotFound(PathBuf),

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a hint to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            match err {
                CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    CliError::FileNotFound(path.as_ref().to_path_buf())
                }
                other => other,
            }
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{err}\n\nHint: {hint}"))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{msg}: {err}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpack_config::BuildMode;

    #[test]
    fn test_config_error_not_found() {
        let err = ProjectConfigError::NotFound(PathBuf::from("blockpack.config.json"));
        let msg = err.to_string();
        assert!(msg.contains("Config file not found"));
        assert!(msg.contains("blockpack.config.json"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_resolution_error_keeps_field() {
        let err: CliError = blockpack_config::ConfigError::UndeclaredPath {
            field: "htmlTemplate".to_string(),
            mode: BuildMode::Development,
        }
        .into();
        assert!(matches!(err, CliError::Resolve(_)));
        assert!(err.to_string().contains("htmlTemplate"));
    }

    #[test]
    fn test_external_tool_error_is_verbatim() {
        let err = CliError::ExternalTool {
            tool: "webpack".to_string(),
            status: Some(2),
            stderr: "Module not found: ./missing\n".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("webpack failed (exit code 2)"));
        assert!(msg.ends_with("Module not found: ./missing"));
    }

    #[test]
    fn test_external_tool_without_stderr() {
        let err = CliError::ExternalTool {
            tool: "webpack".to_string(),
            status: None,
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "webpack failed (terminated by signal)");
    }

    #[test]
    fn test_result_ext_with_path() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));

        let err = result.with_path("/test/path.txt").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn test_result_ext_with_hint() {
        let result: std::result::Result<(), ProjectConfigError> =
            Err(ProjectConfigError::NotFound(PathBuf::from("test.json")));

        let err = result.with_hint("Try creating the file").unwrap_err();
        assert!(err.to_string().contains("Hint: Try creating the file"));
    }

    #[test]
    fn test_result_ext_context() {
        let result: std::result::Result<(), ProjectConfigError> =
            Err(ProjectConfigError::NotFound(PathBuf::from("test.json")));

        let err = result.context("Failed to load project").unwrap_err();
        assert!(err.to_string().starts_with("Failed to load project: "));
    }
}
