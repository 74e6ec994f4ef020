//! Miette diagnostic conversion for CLI errors.

use blockpack_config::ConfigError;
use miette::Report;

use crate::error::CliError;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Resolve(e) => resolve_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        CliError::ExternalTool { .. } => miette::miette!(
            help = "The bundler's own output is shown above; blockpack does not retry it",
            "{}",
            err
        ),
        _ => miette::miette!("{}", err),
    }
}

/// Convert a resolution error to a report with a hint naming the config field.
pub fn resolve_error_to_miette(err: ConfigError) -> Report {
    let code = format!("blockpack::{}", variant_code(&err));
    match &err {
        ConfigError::MissingPath { field, .. } | ConfigError::UndeclaredPath { field, .. } => {
            miette::miette!(
                code = code,
                help = format!("Check the '{field}' field in blockpack.config.json"),
                "{}",
                err
            )
        }
        ConfigError::AmbiguousMatch { .. } => miette::miette!(
            code = code,
            help = "Remove the extension from 'assetExtensions'; it is already handled by another rule",
            "{}",
            err
        ),
        ConfigError::MalformedPeerDependencies { .. } => miette::miette!(
            code = code,
            help = "peerDependencies must map package names to version strings",
            "{}",
            err
        ),
        ConfigError::PlanContract { .. } => miette::miette!(
            code = code,
            help = "Drop the explicit mode flag or BLOCKPACK_MODE override for this command",
            "{}",
            err
        ),
        _ => miette::miette!(code = code, "{}", err),
    }
}

fn variant_code(err: &ConfigError) -> &'static str {
    match err {
        ConfigError::MissingPath { .. } => "missing_path",
        ConfigError::UndeclaredPath { .. } => "undeclared_path",
        ConfigError::AmbiguousPath { .. } => "ambiguous_path",
        ConfigError::AmbiguousMatch { .. } => "ambiguous_match",
        ConfigError::MalformedPeerDependencies { .. } => "malformed_peer_dependencies",
        ConfigError::InvalidPattern { .. } => "invalid_pattern",
        ConfigError::InvalidProxyTarget { .. } => "invalid_proxy_target",
        ConfigError::PlanContract { .. } => "plan_contract",
        ConfigError::InvalidValue { .. } => "invalid_value",
        ConfigError::Io { .. } => "io",
        ConfigError::Json { .. } => "json",
    }
}
