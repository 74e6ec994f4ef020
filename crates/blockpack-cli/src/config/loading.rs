use crate::config::{default_entry, default_metadata_output, ProjectConfig, CONFIG_FILE};
use crate::error::{ProjectConfigError, Result};
use figment::{
    providers::{Env, Format as _, Json, Serialized},
    Figment,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix of environment variables that override config fields.
pub const ENV_PREFIX: &str = "BLOCKPACK_";

/// `BLOCKPACK_MODE` and `BLOCKPACK_PLAN` share the prefix but are not fields.
const RESERVED_ENV_KEYS: &[&str] = &["mode", "plan"];

/// Values given on the command line; unset ones leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_server_port: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundler_command: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_server_command: Option<String>,
}

/// Map an environment key (prefix removed) to a config field path.
///
/// `OUTPUT_DIR` → `outputDir`, `ENTRY__PRODUCTION` → `entry.production`.
pub fn env_key_to_field(key: &str) -> String {
    key.to_ascii_lowercase()
        .split("__")
        .map(|segment| {
            let mut field = String::with_capacity(segment.len());
            let mut upper = false;
            for c in segment.chars() {
                if c == '_' {
                    upper = true;
                } else if upper {
                    field.push(c.to_ascii_uppercase());
                    upper = false;
                } else {
                    field.push(c);
                }
            }
            field
        })
        .collect::<Vec<_>>()
        .join(".")
}

impl ProjectConfig {
    /// Locate the config file: an explicit path must exist, the default one may not.
    pub fn config_file(cwd: &Path, config_path: Option<&Path>) -> Result<Option<PathBuf>> {
        match config_path {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    cwd.join(path)
                };
                if path.is_file() {
                    Ok(Some(path))
                } else {
                    Err(ProjectConfigError::NotFound(path).into())
                }
            }
            None => {
                let default_path = cwd.join(CONFIG_FILE);
                Ok(default_path.is_file().then_some(default_path))
            }
        }
    }

    /// Layer defaults, the config file and `BLOCKPACK_*` variables.
    ///
    /// Only the per-mode path pairs are seeded here, so a partial override
    /// such as `entry.production` keeps the other mode's default. Every other
    /// field falls back to its serde default, and a `devServerProxy` list
    /// replaces the default route instead of extending it.
    pub fn figment(cwd: &Path, config_path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new()
            .merge(Serialized::default("entry", default_entry()))
            .merge(Serialized::default("metadataOutput", default_metadata_output()));

        if let Some(path) = Self::config_file(cwd, config_path)? {
            debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Json::file(path));
        }

        // BLOCKPACK_OUTPUT_DIR, BLOCKPACK_DEV_SERVER_PORT, BLOCKPACK_ENTRY__PRODUCTION, ...
        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(RESERVED_ENV_KEYS)
                .map(|key| env_key_to_field(key.as_str()).into())
                .lowercase(false),
        );

        Ok(figment)
    }

    /// Load configuration from all sources.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(cwd: &Path, config_path: Option<&Path>, overrides: &CliOverrides) -> Result<Self> {
        Self::figment(cwd, config_path)?
            .merge(Serialized::defaults(overrides))
            .extract()
            .map_err(|e| {
                let field = if e.path.is_empty() {
                    "configuration".to_string()
                } else {
                    e.path.join(".")
                };
                ProjectConfigError::InvalidValue {
                    field,
                    value: e.to_string(),
                    hint: format!("Check {CONFIG_FILE} and {ENV_PREFIX}* variables"),
                }
                .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_key_to_field() {
        assert_eq!(env_key_to_field("OUTPUT_DIR"), "outputDir");
        assert_eq!(env_key_to_field("DEV_SERVER_PORT"), "devServerPort");
        assert_eq!(env_key_to_field("ENTRY__PRODUCTION"), "entry.production");
        assert_eq!(env_key_to_field("entry"), "entry");
    }

    #[test]
    fn test_overrides_skip_unset_values() {
        let value = serde_json::to_value(CliOverrides {
            dev_server_port: Some(3000),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(value, serde_json::json!({ "devServerPort": 3000 }));
    }
}
