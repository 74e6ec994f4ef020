use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A path that differs between production and development builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModePaths {
    /// Used by production (library) builds
    pub production: PathBuf,

    /// Used by development (harness) builds
    pub development: PathBuf,
}

/// A dev-server proxy route and the backend it forwards to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProxyConfig {
    /// Request path pattern; a trailing `*` matches any suffix
    #[schemars(regex(pattern = r"^/"))]
    pub path: String,

    /// Backend origin, e.g. "http://localhost:5000"
    #[schemars(regex(pattern = r"^https?://"))]
    pub target: String,

    /// Rewrite the request origin; only `true` is supported
    #[serde(default = "crate::config::defaults::default_change_origin")]
    pub change_origin: bool,
}
