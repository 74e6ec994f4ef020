//! Plugin pipeline composition.
//!
//! Each plugin kind carries a fixed ordering key; the pipeline for a mode is
//! the applicable kinds sorted by that key. The build-metadata emitter has
//! the highest key so it observes the final asset references of every
//! other plugin.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::mode::{Applicability, BuildMode};
use crate::paths::{AssetPaths, LogicalPath};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const HTML_FILE: &str = "index.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PluginKind {
    HtmlTemplate,
    StaticCopy,
    HotModuleReplacement,
    AssetManifest,
    BuildMetadata,
}

impl PluginKind {
    pub const ALL: [PluginKind; 5] = [
        PluginKind::HtmlTemplate,
        PluginKind::StaticCopy,
        PluginKind::HotModuleReplacement,
        PluginKind::AssetManifest,
        PluginKind::BuildMetadata,
    ];

    /// Position in the pipeline; lower runs earlier.
    pub fn ordering_key(self) -> u16 {
        match self {
            Self::HtmlTemplate => 10,
            Self::StaticCopy => 20,
            Self::HotModuleReplacement => 30,
            Self::AssetManifest => 40,
            Self::BuildMetadata => 100,
        }
    }

    pub fn applicability(self) -> Applicability {
        match self {
            Self::HtmlTemplate | Self::HotModuleReplacement => Applicability::Development,
            Self::StaticCopy | Self::AssetManifest => Applicability::Production,
            Self::BuildMetadata => Applicability::Both,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::HtmlTemplate => "html-template",
            Self::StaticCopy => "static-copy",
            Self::HotModuleReplacement => "hot-module-replacement",
            Self::AssetManifest => "asset-manifest",
            Self::BuildMetadata => "build-metadata",
        }
    }
}

/// Copy `from` (absolute) to `to` (relative to the output directory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyPattern {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PluginOptions {
    HtmlTemplate { template: PathBuf, filename: String },
    StaticCopy { patterns: Vec<CopyPattern> },
    HotModuleReplacement,
    /// `output` is relative to the output directory.
    AssetManifest { output: String },
    BuildMetadata { output: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSpec {
    pub name: PluginKind,
    pub applicability: Applicability,
    pub ordering_key: u16,
    pub options: PluginOptions,
}

impl PluginSpec {
    fn new(kind: PluginKind, options: PluginOptions) -> Self {
        Self {
            name: kind,
            applicability: kind.applicability(),
            ordering_key: kind.ordering_key(),
            options,
        }
    }
}

fn plugin_options(kind: PluginKind, paths: &AssetPaths) -> Result<PluginOptions> {
    Ok(match kind {
        PluginKind::HtmlTemplate => PluginOptions::HtmlTemplate {
            template: paths.require(LogicalPath::HtmlTemplate)?.to_path_buf(),
            filename: HTML_FILE.to_string(),
        },
        PluginKind::StaticCopy => PluginOptions::StaticCopy {
            patterns: vec![
                CopyPattern {
                    from: paths.require(LogicalPath::AssetsDir)?.to_path_buf(),
                    to: PathBuf::from("public"),
                },
                CopyPattern {
                    from: paths.require(LogicalPath::BlockInfo)?.to_path_buf(),
                    to: PathBuf::from("."),
                },
            ],
        },
        PluginKind::HotModuleReplacement => PluginOptions::HotModuleReplacement,
        PluginKind::AssetManifest => PluginOptions::AssetManifest {
            output: MANIFEST_FILE.to_string(),
        },
        PluginKind::BuildMetadata => PluginOptions::BuildMetadata {
            output: paths.require(LogicalPath::MetadataOutput)?.to_path_buf(),
        },
    })
}

/// Compose the ordered plugin pipeline for `mode`.
///
/// Production: static copy, asset manifest, build metadata.
/// Development: HTML template, hot-module replacement, build metadata.
pub fn compose_plugins(mode: BuildMode, paths: &AssetPaths) -> Result<Vec<PluginSpec>> {
    let mut plugins = PluginKind::ALL
        .into_iter()
        .filter(|kind| kind.applicability().applies_to(mode))
        .map(|kind| Ok(PluginSpec::new(kind, plugin_options(kind, paths)?)))
        .collect::<Result<Vec<_>>>()?;

    plugins.sort_by_key(|plugin| plugin.ordering_key);

    match plugins.last() {
        Some(last) if last.name == PluginKind::BuildMetadata => {}
        _ => {
            return Err(ConfigError::PlanContract {
                mode,
                reason: "build-metadata emitter must be the last plugin".to_string(),
            });
        }
    }

    debug!(
        %mode,
        plugins = ?plugins.iter().map(|p| p.name.name()).collect::<Vec<_>>(),
        "plugin pipeline composed"
    );
    Ok(plugins)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_has_the_highest_key() {
        let max_other = PluginKind::ALL
            .into_iter()
            .filter(|kind| *kind != PluginKind::BuildMetadata)
            .map(PluginKind::ordering_key)
            .max()
            .unwrap();
        assert!(PluginKind::BuildMetadata.ordering_key() > max_other);
    }

    #[test]
    fn applicability_partitions_kinds() {
        let production: Vec<_> = PluginKind::ALL
            .into_iter()
            .filter(|k| k.applicability().applies_to(BuildMode::Production))
            .collect();
        assert_eq!(
            production,
            vec![
                PluginKind::StaticCopy,
                PluginKind::AssetManifest,
                PluginKind::BuildMetadata
            ]
        );
    }

    #[test]
    fn options_serialize_with_type_tag() {
        let options = PluginOptions::AssetManifest {
            output: MANIFEST_FILE.to_string(),
        };
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(value["type"], "asset-manifest");
        assert_eq!(value["output"], "manifest.json");
    }
}
