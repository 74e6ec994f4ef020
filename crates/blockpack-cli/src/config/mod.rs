//! Project configuration loaded from `blockpack.config.json`.
//!
//! Merges settings from CLI args, environment variables, and the config file.
//! Priority: CLI > Environment > File > Defaults

mod conversions;
mod defaults;
mod loading;
mod types;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use defaults::*;
pub use loading::{env_key_to_field, CliOverrides, ENV_PREFIX};
pub use types::*;

/// blockpack configuration - every field has a default matching the
/// standard block project layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectConfig {
    /// Entry module per mode
    #[serde(default = "default_entry")]
    pub entry: ModePaths,

    /// Directory the bundle is emitted into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Static assets: copied to `<outputDir>/public` in production, served in development
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// Block metadata directory copied into the output root (production)
    #[serde(default = "default_block_info")]
    pub block_info: PathBuf,

    /// HTML page template for the development harness
    #[serde(default = "default_html_template")]
    pub html_template: PathBuf,

    /// Build metadata summary location per mode
    #[serde(default = "default_metadata_output")]
    pub metadata_output: ModePaths,

    /// Environment file substituted into the bundle, if present
    #[serde(default = "default_env_file")]
    pub env_file: PathBuf,

    /// Extra file extensions handled as binary assets
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub asset_extensions: Vec<String>,

    /// Dev-server port
    #[serde(default = "default_dev_server_port")]
    pub dev_server_port: u16,

    /// Dev-server proxy routes, tried in order; the first matching path wins
    #[serde(default = "default_dev_server_proxy")]
    pub dev_server_proxy: Vec<ProxyConfig>,

    /// Command run by `blockpack build`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundler_command: Option<String>,

    /// Command run by `blockpack dev`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_server_command: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            entry: default_entry(),
            output_dir: default_output_dir(),
            assets_dir: default_assets_dir(),
            block_info: default_block_info(),
            html_template: default_html_template(),
            metadata_output: default_metadata_output(),
            env_file: default_env_file(),
            asset_extensions: Vec::new(),
            dev_server_port: default_dev_server_port(),
            dev_server_proxy: default_dev_server_proxy(),
            bundler_command: None,
            dev_server_command: None,
        }
    }
}

impl ProjectConfig {
    /// JSON Schema for `blockpack.config.json`.
    pub fn json_schema() -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(schemars::schema_for!(ProjectConfig))
    }
}
