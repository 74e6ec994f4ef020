//! Single-pass resolution from declared inputs to a [`BuildPlan`].

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use tracing::info;

use crate::dev_server::{build_dev_server_config, DeclaredProxyRoute, DevServerOptions};
use crate::error::Result;
use crate::externals::resolve_externals;
use crate::loaders::build_loader_rules_with;
use crate::mode::{decide_mode, BuildMode, ModeDecision};
use crate::package::PackageManifest;
use crate::paths::{resolve_asset_paths, DeclaredPaths};
use crate::plan::{emit_plan, BuildPlan};
use crate::plugins::compose_plugins;

/// Everything the resolver reads, already loaded by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveInputs {
    pub base_dir: PathBuf,
    pub declared_paths: DeclaredPaths,
    pub peer_dependency_names: BTreeSet<String>,
    pub proxy_routes: Vec<DeclaredProxyRoute>,
    pub dev_server: DevServerOptions,
    /// Extra file extensions handled by the binary asset rule.
    pub asset_extensions: Vec<String>,
}

impl ResolveInputs {
    /// Inputs for a project using the standard block layout and no proxy.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            declared_paths: DeclaredPaths::block_defaults(),
            peer_dependency_names: BTreeSet::new(),
            proxy_routes: Vec::new(),
            dev_server: DevServerOptions::default(),
            asset_extensions: Vec::new(),
        }
    }

    /// Read peer dependency names from the project's `package.json`.
    pub fn with_package_manifest(mut self) -> Result<Self> {
        let manifest = PackageManifest::load(&self.base_dir)?;
        self.peer_dependency_names = manifest.peer_dependency_names();
        Ok(self)
    }

    pub fn with_declared_paths(mut self, declared: DeclaredPaths) -> Self {
        self.declared_paths = declared;
        self
    }

    pub fn with_peer_dependencies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.peer_dependency_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_proxy_route(mut self, route: DeclaredProxyRoute) -> Self {
        self.proxy_routes.push(route);
        self
    }

    pub fn with_dev_server(mut self, options: DevServerOptions) -> Self {
        self.dev_server = options;
        self
    }

    pub fn with_asset_extensions(mut self, extensions: Vec<String>) -> Self {
        self.asset_extensions = extensions;
        self
    }
}

/// Resolve the plan for an already decided mode.
pub fn resolve_plan(mode: BuildMode, inputs: &ResolveInputs) -> Result<BuildPlan> {
    let asset_paths = resolve_asset_paths(mode, &inputs.declared_paths, &inputs.base_dir)?;
    let externals = resolve_externals(mode, &inputs.peer_dependency_names);
    let loader_rules = build_loader_rules_with(mode, &inputs.asset_extensions)?;
    let plugins = compose_plugins(mode, &asset_paths)?;
    let dev_server = match mode {
        BuildMode::Development => Some(build_dev_server_config(
            &asset_paths,
            &inputs.proxy_routes,
            inputs.dev_server,
        )?),
        BuildMode::Production => None,
    };

    emit_plan(mode, asset_paths, externals, loader_rules, plugins, dev_server)
}

/// Decide the mode from the invocation, then resolve its plan.
pub fn resolve_invocation<S: AsRef<str>>(
    argv: &[S],
    env: &HashMap<String, String>,
    inputs: &ResolveInputs,
) -> Result<(ModeDecision, BuildPlan)> {
    let decision = decide_mode(argv, env);
    info!(mode = %decision.mode, reason = ?decision.reason, "resolving build plan");
    let plan = resolve_plan(decision.mode, inputs)?;
    Ok((decision, plan))
}
