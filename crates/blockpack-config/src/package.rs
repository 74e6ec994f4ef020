//! Reading the project's `package.json`.
//!
//! Only the `name` and `peerDependencies` fields matter here. The peer
//! dependency table is validated strictly: a malformed declaration is a
//! configuration error, never silently skipped.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{ConfigError, Result};

pub const PACKAGE_JSON: &str = "package.json";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageManifest {
    pub name: Option<String>,
    /// Peer dependency name to version range.
    pub peer_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Load `package.json` from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(PACKAGE_JSON);
        if !path.exists() {
            return Err(ConfigError::MissingPath {
                field: PACKAGE_JSON.to_string(),
                path,
            });
        }

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|source| ConfigError::Json { path, source })?;

        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(ConfigError::InvalidValue {
                field: PACKAGE_JSON.to_string(),
                value: value.to_string(),
                hint: "package.json must contain a JSON object".to_string(),
            });
        };

        let name = object.get("name").and_then(Value::as_str).map(str::to_string);
        let peer_dependencies = match object.get("peerDependencies") {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(table) => parse_peer_dependencies(table)?,
        };

        Ok(Self {
            name,
            peer_dependencies,
        })
    }

    /// Declared peer dependency names; versions are not consulted.
    pub fn peer_dependency_names(&self) -> BTreeSet<String> {
        self.peer_dependencies.keys().cloned().collect()
    }
}

fn parse_peer_dependencies(table: &Value) -> Result<BTreeMap<String, String>> {
    let Some(entries) = table.as_object() else {
        return Err(ConfigError::MalformedPeerDependencies {
            field: None,
            reason: "expected an object mapping package names to versions".to_string(),
        });
    };

    let mut peers = BTreeMap::new();
    for (name, version) in entries {
        if name.trim().is_empty() {
            return Err(ConfigError::MalformedPeerDependencies {
                field: Some(name.clone()),
                reason: "package name cannot be empty".to_string(),
            });
        }
        let Some(version) = version.as_str() else {
            return Err(ConfigError::MalformedPeerDependencies {
                field: Some(name.clone()),
                reason: format!("version must be a string, got {version}"),
            });
        };
        peers.insert(name.clone(), version.to_string());
    }

    Ok(peers)
}
