pub mod dev_server;
pub mod error;
pub mod externals;
pub mod loaders;
pub mod mode;
pub mod package;
pub mod paths;
pub mod plan;
pub mod plugins;
pub mod resolve;

// Re-export main types
pub use dev_server::{
    build_dev_server_config, cors_headers, DeclaredProxyRoute, DevServerConfig, DevServerOptions,
    ProxyRoute,
};
pub use error::{ConfigError, Result};
pub use externals::{resolve_externals, ExternalsSet};
pub use loaders::{
    build_loader_rules, build_loader_rules_with, AssetClass, LoaderRule, LoaderTable, StageKind,
    TransformStage,
};
pub use mode::{decide_mode, detect_mode, Applicability, BuildMode, ModeDecision, ModeReason};
pub use package::PackageManifest;
pub use paths::{resolve_asset_paths, AssetPaths, DeclaredPaths, LogicalPath};
pub use plan::{emit_plan, BuildPlan, EnvInjection, OutputSpec, ResolveRules};
pub use plugins::{compose_plugins, CopyPattern, PluginKind, PluginOptions, PluginSpec};
pub use resolve::{resolve_invocation, resolve_plan, ResolveInputs};
