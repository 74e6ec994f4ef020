//! Error types for build-plan resolution.
//!
//! Every variant names the offending field so the host can report it
//! verbatim. All of them are fatal: resolution is all-or-nothing.

use std::path::PathBuf;

use thiserror::Error;

use crate::mode::BuildMode;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A path required by the selected mode does not exist on disk.
    #[error("{field}: path not found: {}", path.display())]
    MissingPath { field: String, path: PathBuf },

    /// The declared table has no entry for a path the selected mode needs.
    #[error("{field}: no path declared for {mode} builds")]
    UndeclaredPath { field: String, mode: BuildMode },

    /// More than one declared entry applies to the selected mode.
    #[error("{field}: more than one path declared for {mode} builds")]
    AmbiguousPath { field: String, mode: BuildMode },

    /// An asset matched more than one loader rule.
    #[error("asset '{asset}' matches more than one loader rule: {}", rules.join(", "))]
    AmbiguousMatch { asset: String, rules: Vec<String> },

    #[error("peerDependencies{}: {reason}", field_suffix(field))]
    MalformedPeerDependencies { field: Option<String>, reason: String },

    #[error("loader rule '{rule}': invalid match pattern: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("devServerProxy '{route}': invalid target origin '{target}'")]
    InvalidProxyTarget { route: String, target: String },

    /// The composed inputs do not fit the plan's mode.
    #[error("{mode} plan rejected: {reason}")]
    PlanContract { mode: BuildMode, reason: String },

    #[error("invalid value for '{field}': {value} ({hint})")]
    InvalidValue {
        field: String,
        value: String,
        hint: String,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Name of the declared field the error refers to, when there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingPath { field, .. }
            | Self::UndeclaredPath { field, .. }
            | Self::AmbiguousPath { field, .. }
            | Self::InvalidValue { field, .. } => Some(field),
            Self::MalformedPeerDependencies { .. } => Some("peerDependencies"),
            Self::InvalidProxyTarget { .. } => Some("devServerProxy"),
            _ => None,
        }
    }
}

fn field_suffix(field: &Option<String>) -> String {
    match field {
        Some(name) => format!(".{name}"),
        None => String::new(),
    }
}
