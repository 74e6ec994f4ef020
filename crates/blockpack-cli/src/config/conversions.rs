use std::collections::HashMap;
use std::path::Path;

use blockpack_config::{
    Applicability, DeclaredPaths, DeclaredProxyRoute, DevServerOptions, LogicalPath, ResolveInputs,
};

use crate::config::ProjectConfig;
use crate::error::{ProjectConfigError, Result};

// Conversions: project config -> engine inputs

impl ProjectConfig {
    /// The declared path table handed to the resolver.
    pub fn declared_paths(&self) -> DeclaredPaths {
        DeclaredPaths::new()
            .declare_for(LogicalPath::Entry, Applicability::Production, &self.entry.production)
            .declare_for(LogicalPath::Entry, Applicability::Development, &self.entry.development)
            .declare(LogicalPath::OutputDir, &self.output_dir)
            .declare(LogicalPath::AssetsDir, &self.assets_dir)
            .declare(LogicalPath::BlockInfo, &self.block_info)
            .declare_for(
                LogicalPath::HtmlTemplate,
                Applicability::Development,
                &self.html_template,
            )
            .declare_for(
                LogicalPath::MetadataOutput,
                Applicability::Production,
                &self.metadata_output.production,
            )
            .declare_for(
                LogicalPath::MetadataOutput,
                Applicability::Development,
                &self.metadata_output.development,
            )
            .declare(LogicalPath::EnvFile, &self.env_file)
    }

    /// Proxy routes in declaration order.
    pub fn proxy_routes(&self) -> Result<Vec<DeclaredProxyRoute>> {
        self.dev_server_proxy
            .iter()
            .enumerate()
            .map(|(index, proxy)| -> Result<DeclaredProxyRoute> {
                if !proxy.change_origin {
                    return Err(ProjectConfigError::InvalidValue {
                        field: format!("devServerProxy.{index}.changeOrigin"),
                        value: "false".to_string(),
                        hint: "Proxied requests always rewrite their origin; remove the field"
                            .to_string(),
                    }
                    .into());
                }
                Ok(DeclaredProxyRoute::new(proxy.path.as_str(), proxy.target.as_str()))
            })
            .collect()
    }

    /// Everything the resolver needs, including peer dependencies from
    /// `<base_dir>/package.json`.
    pub fn resolve_inputs(
        &self,
        base_dir: &Path,
        env: &HashMap<String, String>,
    ) -> Result<ResolveInputs> {
        let inputs = ResolveInputs::new(base_dir)
            .with_declared_paths(self.declared_paths())
            .with_dev_server(DevServerOptions::from_env(self.dev_server_port, env))
            .with_asset_extensions(self.asset_extensions.clone())
            .with_package_manifest()?;

        Ok(self
            .proxy_routes()?
            .into_iter()
            .fold(inputs, ResolveInputs::with_proxy_route))
    }
}
