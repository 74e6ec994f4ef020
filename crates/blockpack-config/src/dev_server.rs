//! Dev-server settings, derived only for development builds.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, Result};
use crate::mode::BuildMode;
use crate::paths::{AssetPaths, LogicalPath};

pub const DEFAULT_PORT: u16 = 8080;

/// Setting this to `none` stops the dev server from opening a browser.
pub const BROWSER_ENV_VAR: &str = "BROWSER";

pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, PATCH, OPTIONS";

/// Request headers a separately hosted API may receive, including the
/// distributed-tracing header.
pub const ALLOWED_HEADERS: &[&str] = &[
    "X-Requested-With",
    "content-type",
    "Authorization",
    "sentry-trace",
];

/// A proxy route as declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredProxyRoute {
    pub path_pattern: String,
    pub target: String,
}

impl DeclaredProxyRoute {
    pub fn new(path_pattern: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            path_pattern: path_pattern.into(),
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRoute {
    pub path_pattern: String,
    pub target_origin: String,
    /// Rewrite the `Origin`/`Host` so the backend sees a same-origin request.
    pub rewrite_origin: bool,
}

impl ProxyRoute {
    /// Whether a request path is forwarded by this route.
    ///
    /// A trailing `*` makes the pattern a prefix match.
    pub fn matches(&self, path: &str) -> bool {
        match self.path_pattern.strip_suffix('*') {
            Some(prefix) => path.starts_with(prefix),
            None => path == self.path_pattern,
        }
    }
}

/// Host-supplied knobs that are not part of the declared path table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevServerOptions {
    pub port: u16,
    pub open_browser: bool,
}

impl Default for DevServerOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            open_browser: true,
        }
    }
}

impl DevServerOptions {
    /// Apply the `BROWSER=none` convention.
    pub fn from_env(port: u16, env: &HashMap<String, String>) -> Self {
        Self {
            port,
            open_browser: env.get(BROWSER_ENV_VAR).map(String::as_str) != Some("none"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServerConfig {
    pub headers: IndexMap<String, String>,
    pub proxy_routes: Vec<ProxyRoute>,
    pub static_root: PathBuf,
    pub port: u16,
    pub hot_reload_enabled: bool,
    pub open_browser: bool,
}

impl DevServerConfig {
    /// The proxy route a request path is forwarded through.
    ///
    /// Routes are tried in declaration order and the first match wins.
    pub fn route_for(&self, path: &str) -> Option<&ProxyRoute> {
        self.proxy_routes.iter().find(|route| route.matches(path))
    }
}

/// Permissive cross-origin headers attached to every dev-server response.
pub fn cors_headers() -> IndexMap<String, String> {
    let mut headers = IndexMap::new();
    headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
    headers.insert(
        "Access-Control-Allow-Methods".to_string(),
        ALLOWED_METHODS.to_string(),
    );
    headers.insert(
        "Access-Control-Allow-Headers".to_string(),
        ALLOWED_HEADERS.join(", "),
    );
    headers
}

/// Accept a bare `http(s)://host[:port]` origin, tolerating one trailing slash.
fn validate_target(route: &DeclaredProxyRoute) -> Result<String> {
    let target = route.target.trim();
    let target = target.strip_suffix('/').unwrap_or(target);
    let authority = target
        .strip_prefix("http://")
        .or_else(|| target.strip_prefix("https://"));

    match authority {
        Some(authority)
            if !authority.is_empty() && !authority.contains(['/', '?', '#', ' ']) =>
        {
            Ok(target.to_string())
        }
        _ => Err(ConfigError::InvalidProxyTarget {
            route: route.path_pattern.clone(),
            target: route.target.clone(),
        }),
    }
}

/// Build the dev-server settings for a development build.
///
/// Static files are served from the declared assets directory, and every
/// declared proxy route rewrites its origin.
pub fn build_dev_server_config(
    paths: &AssetPaths,
    declared_proxy_routes: &[DeclaredProxyRoute],
    options: DevServerOptions,
) -> Result<DevServerConfig> {
    if paths.mode() != BuildMode::Development {
        return Err(ConfigError::PlanContract {
            mode: paths.mode(),
            reason: "dev-server settings exist only for development builds".to_string(),
        });
    }

    let mut seen = HashSet::new();
    let proxy_routes = declared_proxy_routes
        .iter()
        .map(|route| {
            if !seen.insert(route.path_pattern.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "devServerProxy".to_string(),
                    value: route.path_pattern.clone(),
                    hint: "each proxy path may be declared once".to_string(),
                });
            }
            Ok(ProxyRoute {
                path_pattern: route.path_pattern.clone(),
                target_origin: validate_target(route)?,
                rewrite_origin: true,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let config = DevServerConfig {
        headers: cors_headers(),
        proxy_routes,
        static_root: paths.require(LogicalPath::AssetsDir)?.to_path_buf(),
        port: options.port,
        hot_reload_enabled: true,
        open_browser: options.open_browser,
    };

    for route in &config.proxy_routes {
        let sample = route.path_pattern.trim_end_matches('*');
        if let Some(first) = config.route_for(sample) {
            if first.path_pattern != route.path_pattern {
                warn!(
                    route = %route.path_pattern,
                    shadowed_by = %first.path_pattern,
                    "proxy route is unreachable; an earlier route matches first"
                );
            }
        }
    }

    debug!(port = config.port, routes = config.proxy_routes.len(), "dev server configured");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_headers_include_tracing_header() {
        let headers = cors_headers();
        assert_eq!(headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(
            headers["Access-Control-Allow-Methods"],
            "GET, POST, PUT, DELETE, PATCH, OPTIONS"
        );
        assert!(headers["Access-Control-Allow-Headers"].contains("sentry-trace"));
    }

    #[test]
    fn wildcard_pattern_is_prefix_match() {
        let route = ProxyRoute {
            path_pattern: "/api/*".to_string(),
            target_origin: "http://localhost:5000".to_string(),
            rewrite_origin: true,
        };
        assert!(route.matches("/api/users/1"));
        assert!(!route.matches("/assets/logo.png"));
    }

    #[test]
    fn browser_none_disables_open() {
        let env = HashMap::from([("BROWSER".to_string(), "none".to_string())]);
        assert!(!DevServerOptions::from_env(8080, &env).open_browser);
        assert!(DevServerOptions::from_env(8080, &HashMap::new()).open_browser);
    }

    #[test]
    fn target_must_be_http_origin() {
        let ok = DeclaredProxyRoute::new("/api/*", "http://localhost:5000/");
        assert_eq!(validate_target(&ok).unwrap(), "http://localhost:5000");

        let with_port = DeclaredProxyRoute::new("/api/*", "https://api.example.com:8443");
        assert_eq!(validate_target(&with_port).unwrap(), "https://api.example.com:8443");

        for bad in [
            "localhost:5000",
            "ftp://host",
            "http://",
            "https:///path",
            "http://localhost:5000/api",
            "http://localhost:5000//",
            "http://localhost:5000?x=1",
        ] {
            let route = DeclaredProxyRoute::new("/api/*", bad);
            assert!(
                matches!(validate_target(&route), Err(ConfigError::InvalidProxyTarget { .. })),
                "{bad} should be rejected"
            );
        }
    }

    fn development_paths() -> (tempfile::TempDir, AssetPaths) {
        let dir = tempfile::TempDir::new().unwrap();
        for sub in ["public", "block-info", "dist/build", "src"] {
            std::fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        std::fs::write(dir.path().join("dist/build/Dev.fs.js"), "").unwrap();
        std::fs::write(dir.path().join("src/index.html"), "").unwrap();
        let paths = crate::paths::resolve_asset_paths(
            BuildMode::Development,
            &crate::paths::DeclaredPaths::block_defaults(),
            dir.path(),
        )
        .unwrap();
        (dir, paths)
    }

    #[test]
    fn routes_keep_declaration_order_and_first_match_wins() {
        let (_dir, paths) = development_paths();
        let declared = [
            DeclaredProxyRoute::new("/api/v2/*", "http://localhost:6000"),
            DeclaredProxyRoute::new("/api/*", "http://localhost:5000"),
        ];
        let config =
            build_dev_server_config(&paths, &declared, DevServerOptions::default()).unwrap();

        let patterns: Vec<&str> = config
            .proxy_routes
            .iter()
            .map(|route| route.path_pattern.as_str())
            .collect();
        assert_eq!(patterns, ["/api/v2/*", "/api/*"]);
        assert_eq!(
            config.route_for("/api/v2/users").unwrap().target_origin,
            "http://localhost:6000"
        );
        assert_eq!(
            config.route_for("/api/users").unwrap().target_origin,
            "http://localhost:5000"
        );
        assert!(config.route_for("/static/app.js").is_none());
    }

    #[test]
    fn duplicate_proxy_path_is_rejected() {
        let (_dir, paths) = development_paths();
        let declared = [
            DeclaredProxyRoute::new("/api/*", "http://localhost:5000"),
            DeclaredProxyRoute::new("/api/*", "http://localhost:6000"),
        ];
        let err =
            build_dev_server_config(&paths, &declared, DevServerOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, ref value, .. }
                if field == "devServerProxy" && value == "/api/*"
        ));
    }
}
