//! The build plan handed to the external bundler.
//!
//! [`emit_plan`] only aggregates. It never fills gaps or drops fields: a
//! component output that contradicts the plan's mode is rejected with
//! [`ConfigError::PlanContract`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::dev_server::DevServerConfig;
use crate::error::{ConfigError, Result};
use crate::externals::ExternalsSet;
use crate::loaders::{AssetClass, LoaderTable, StageKind};
use crate::mode::BuildMode;
use crate::paths::{AssetPaths, LogicalPath};
use crate::plugins::{PluginKind, PluginSpec};

/// Name of the single entry chunk.
pub const ENTRY_CHUNK: &str = "main";

pub const DEVELOPMENT_DEVTOOL: &str = "eval-source-map";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    pub path: PathBuf,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_target: Option<String>,
    /// Empty the output directory before emitting.
    pub clean: bool,
}

impl OutputSpec {
    pub fn for_mode(mode: BuildMode, output_dir: &Path) -> Self {
        match mode {
            BuildMode::Production => Self {
                path: output_dir.to_path_buf(),
                filename: format!("{ENTRY_CHUNK}.[contenthash].js"),
                library_target: Some("commonjs".to_string()),
                clean: true,
            },
            BuildMode::Development => Self {
                path: output_dir.to_path_buf(),
                filename: "[name].js".to_string(),
                library_target: None,
                clean: true,
            },
        }
    }
}

/// Module resolution settings shared by both modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRules {
    pub extensions: Vec<String>,
    pub symlinks: bool,
    pub alias: BTreeMap<String, String>,
}

impl Default for ResolveRules {
    fn default() -> Self {
        Self {
            extensions: [".js", ".jsx", ".json", ".css"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            symlinks: false,
            alias: BTreeMap::from([("core-js/es6".to_string(), "core-js/es".to_string())]),
        }
    }
}

/// Environment values substituted into the bundle at build time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvInjection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_file: Option<PathBuf>,
    /// Pass process environment variables through as well as the file.
    pub system_vars: bool,
    pub node_env: String,
}

impl EnvInjection {
    pub fn for_paths(paths: &AssetPaths) -> Self {
        Self {
            env_file: paths.get(LogicalPath::EnvFile).map(Path::to_path_buf),
            system_vars: true,
            node_env: paths.mode().as_str().to_string(),
        }
    }
}

/// Everything the bundler needs for one build, resolved and validated.
///
/// Only [`emit_plan`] constructs a plan, and it is read-only afterwards:
///
/// ```compile_fail
/// fn force_dev_server(plan: &mut blockpack_config::BuildPlan) {
///     plan.dev_server = None;
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPlan {
    mode: BuildMode,
    asset_paths: AssetPaths,
    entry: IndexMap<String, Vec<PathBuf>>,
    output: OutputSpec,
    resolve: ResolveRules,
    externals: ExternalsSet,
    loader_rules: LoaderTable,
    plugins: Vec<PluginSpec>,
    environment: EnvInjection,
    devtool: Option<String>,
    dev_server: Option<DevServerConfig>,
}

impl BuildPlan {
    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn asset_paths(&self) -> &AssetPaths {
        &self.asset_paths
    }

    /// Chunk name to entry modules.
    pub fn entry(&self) -> &IndexMap<String, Vec<PathBuf>> {
        &self.entry
    }

    pub fn entry_path(&self) -> Option<&Path> {
        self.entry
            .get(ENTRY_CHUNK)
            .and_then(|modules| modules.first())
            .map(PathBuf::as_path)
    }

    pub fn output(&self) -> &OutputSpec {
        &self.output
    }

    pub fn output_dir(&self) -> &Path {
        &self.output.path
    }

    pub fn resolve_rules(&self) -> &ResolveRules {
        &self.resolve
    }

    pub fn externals(&self) -> &ExternalsSet {
        &self.externals
    }

    pub fn loader_rules(&self) -> &LoaderTable {
        &self.loader_rules
    }

    /// Plugins in pipeline order; the metadata emitter is always last.
    pub fn plugins(&self) -> &[PluginSpec] {
        &self.plugins
    }

    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|plugin| plugin.name.name()).collect()
    }

    pub fn environment(&self) -> &EnvInjection {
        &self.environment
    }

    pub fn devtool(&self) -> Option<&str> {
        self.devtool.as_deref()
    }

    /// Present exactly when the plan is for development.
    pub fn dev_server(&self) -> Option<&DevServerConfig> {
        self.dev_server.as_ref()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn contract(mode: BuildMode, reason: impl Into<String>) -> ConfigError {
    ConfigError::PlanContract {
        mode,
        reason: reason.into(),
    }
}

fn check_contract(
    mode: BuildMode,
    asset_paths: &AssetPaths,
    externals: &ExternalsSet,
    loader_rules: &LoaderTable,
    plugins: &[PluginSpec],
    dev_server: Option<&DevServerConfig>,
) -> Result<()> {
    if asset_paths.mode() != mode {
        return Err(contract(
            mode,
            format!("asset paths were resolved for {}", asset_paths.mode()),
        ));
    }

    match (mode, dev_server) {
        (BuildMode::Production, Some(_)) => {
            return Err(contract(mode, "production plan must not carry dev-server settings"));
        }
        (BuildMode::Development, None) => {
            return Err(contract(mode, "development plan requires dev-server settings"));
        }
        _ => {}
    }

    if mode == BuildMode::Development && !externals.is_empty() {
        return Err(contract(mode, "development plan must bundle peer dependencies"));
    }

    let styles = loader_rules
        .rule(AssetClass::Style)
        .ok_or_else(|| contract(mode, "loader rules have no style rule"))?;
    let (wanted, forbidden) = match mode {
        BuildMode::Production => (StageKind::StyleExtract, StageKind::StyleInject),
        BuildMode::Development => (StageKind::StyleInject, StageKind::StyleExtract),
    };
    if !styles.has_stage(wanted) || styles.has_stage(forbidden) {
        return Err(contract(mode, "style rule was built for the other mode"));
    }

    if let Some(plugin) = plugins.iter().find(|p| !p.applicability.applies_to(mode)) {
        return Err(contract(
            mode,
            format!("plugin '{}' does not apply to this mode", plugin.name.name()),
        ));
    }
    if plugins.last().map(|p| p.name) != Some(PluginKind::BuildMetadata) {
        return Err(contract(mode, "build-metadata emitter must be the last plugin"));
    }

    Ok(())
}

/// Aggregate resolved components into a [`BuildPlan`].
pub fn emit_plan(
    mode: BuildMode,
    asset_paths: AssetPaths,
    externals: ExternalsSet,
    loader_rules: LoaderTable,
    plugins: Vec<PluginSpec>,
    dev_server: Option<DevServerConfig>,
) -> Result<BuildPlan> {
    check_contract(
        mode,
        &asset_paths,
        &externals,
        &loader_rules,
        &plugins,
        dev_server.as_ref(),
    )?;

    let entry = asset_paths.require(LogicalPath::Entry)?.to_path_buf();
    let output = OutputSpec::for_mode(mode, asset_paths.require(LogicalPath::OutputDir)?);
    let environment = EnvInjection::for_paths(&asset_paths);
    let devtool = match mode {
        BuildMode::Production => None,
        BuildMode::Development => Some(DEVELOPMENT_DEVTOOL.to_string()),
    };

    let mut entries = IndexMap::new();
    entries.insert(ENTRY_CHUNK.to_string(), vec![entry]);

    debug!(%mode, externals = externals.len(), plugins = plugins.len(), "build plan emitted");

    Ok(BuildPlan {
        mode,
        asset_paths,
        entry: entries,
        output,
        resolve: ResolveRules::default(),
        externals,
        loader_rules,
        plugins,
        environment,
        devtool,
        dev_server,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_output_is_hashed_commonjs() {
        let output = OutputSpec::for_mode(BuildMode::Production, Path::new("/p/dist/out"));
        assert_eq!(output.filename, "main.[contenthash].js");
        assert_eq!(output.library_target.as_deref(), Some("commonjs"));
        assert!(output.clean);
    }

    #[test]
    fn development_output_keeps_chunk_names() {
        let output = OutputSpec::for_mode(BuildMode::Development, Path::new("/p/dist/out"));
        assert_eq!(output.filename, "[name].js");
        assert!(output.library_target.is_none());
    }

    #[test]
    fn resolve_rules_alias_core_js() {
        let rules = ResolveRules::default();
        assert_eq!(rules.alias["core-js/es6"], "core-js/es");
        assert!(!rules.symlinks);
        assert_eq!(rules.extensions, vec![".js", ".jsx", ".json", ".css"]);
    }
}
