//! Loader-chain table: which transform stages apply to which files.
//!
//! Stages inside a rule are listed in application order, so the first stage
//! listed is the first one run on the source. Bundlers whose loader protocol
//! applies right-to-left should consume [`LoaderRule::loader_chain`] instead.
//!
//! Rules never overlap. A file matching two rules is a configuration error
//! rather than something decided by rule order.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::mode::BuildMode;

pub const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx"];
pub const STYLE_EXTENSIONS: &[&str] = &["sass", "scss", "css"];
pub const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "woff", "woff2", "ttf", "eot",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageKind {
    ScriptTranspile,
    StylePreprocess,
    StyleExtract,
    StyleInject,
    RawAssetCopy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformStage {
    pub kind: StageKind,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub options: Value,
}

impl TransformStage {
    pub fn new(kind: StageKind) -> Self {
        Self {
            kind,
            options: Value::Null,
        }
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Script,
    Style,
    Binary,
}

impl AssetClass {
    pub fn rule_name(self) -> &'static str {
        match self {
            Self::Script => "scripts",
            Self::Style => "styles",
            Self::Binary => "assets",
        }
    }
}

/// Paths matching `pattern` are skipped unless they also match `unless`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unless: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderRule {
    pub name: String,
    pub class: AssetClass,
    pub extensions: Vec<String>,
    /// Regular expression the bundler matches module paths against.
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Exclusion>,
    /// Stages in application order.
    pub stages: Vec<TransformStage>,
}

impl LoaderRule {
    pub fn new(class: AssetClass, extensions: &[String], allow_query: bool) -> Self {
        let alternatives = extensions
            .iter()
            .map(|ext| regex::escape(ext))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = if allow_query {
            format!(r"\.({alternatives})(\?.*)?$")
        } else {
            format!(r"\.({alternatives})$")
        };

        Self {
            name: class.rule_name().to_string(),
            class,
            extensions: extensions.to_vec(),
            pattern,
            exclude: None,
            stages: Vec::new(),
        }
    }

    pub fn exclude(mut self, exclusion: Exclusion) -> Self {
        self.exclude = Some(exclusion);
        self
    }

    pub fn stage(mut self, stage: TransformStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Stages in the right-to-left order loader pipelines expect.
    pub fn loader_chain(&self) -> Vec<&TransformStage> {
        self.stages.iter().rev().collect()
    }

    pub fn has_stage(&self, kind: StageKind) -> bool {
        self.stages.iter().any(|stage| stage.kind == kind)
    }
}

#[derive(Debug, Clone)]
struct RuleMatcher {
    test: Regex,
    exclude: Option<Regex>,
    unless: Option<Regex>,
}

impl RuleMatcher {
    fn compile(rule: &LoaderRule) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                rule: rule.name.clone(),
                source,
            })
        };

        let test = compile(&rule.pattern)?;
        let (exclude, unless) = match &rule.exclude {
            Some(exclusion) => (
                Some(compile(&exclusion.pattern)?),
                exclusion.unless.as_deref().map(compile).transpose()?,
            ),
            None => (None, None),
        };

        Ok(Self {
            test,
            exclude,
            unless,
        })
    }

    fn matches_extension(&self, path: &str) -> bool {
        self.test.is_match(path)
    }

    fn matches(&self, path: &str) -> bool {
        if !self.test.is_match(path) {
            return false;
        }
        match (&self.exclude, &self.unless) {
            (Some(exclude), unless) if exclude.is_match(path) => {
                unless.as_ref().is_some_and(|keep| keep.is_match(path))
            }
            _ => true,
        }
    }
}

/// Ordered, non-overlapping loader rules with their compiled matchers.
#[derive(Debug, Clone)]
pub struct LoaderTable {
    rules: Vec<LoaderRule>,
    matchers: Vec<RuleMatcher>,
}

impl LoaderTable {
    /// Compile `rules` and reject any extension claimed by more than one rule.
    pub fn new(rules: Vec<LoaderRule>) -> Result<Self> {
        let matchers = rules
            .iter()
            .map(RuleMatcher::compile)
            .collect::<Result<Vec<_>>>()?;

        let table = Self { rules, matchers };
        table.check_overlaps()?;
        Ok(table)
    }

    fn check_overlaps(&self) -> Result<()> {
        for rule in &self.rules {
            for ext in &rule.extensions {
                let probe = format!("src/probe.{ext}");
                let claimed: Vec<String> = self
                    .rules
                    .iter()
                    .zip(&self.matchers)
                    .filter(|(_, matcher)| matcher.matches_extension(&probe))
                    .map(|(other, _)| other.name.clone())
                    .collect();

                if claimed.len() > 1 {
                    return Err(ConfigError::AmbiguousMatch {
                        asset: format!("*.{ext}"),
                        rules: claimed,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn rules(&self) -> &[LoaderRule] {
        &self.rules
    }

    pub fn rule(&self, class: AssetClass) -> Option<&LoaderRule> {
        self.rules.iter().find(|rule| rule.class == class)
    }

    /// The single rule that applies to `path`, if any.
    pub fn match_asset(&self, path: impl AsRef<Path>) -> Result<Option<&LoaderRule>> {
        let normalized = path.as_ref().to_string_lossy().replace('\\', "/");

        let mut matched = self
            .rules
            .iter()
            .zip(&self.matchers)
            .filter(|(_, matcher)| matcher.matches(&normalized))
            .map(|(rule, _)| rule);

        let Some(first) = matched.next() else {
            return Ok(None);
        };
        let rest: Vec<&LoaderRule> = matched.collect();
        if rest.is_empty() {
            return Ok(Some(first));
        }

        Err(ConfigError::AmbiguousMatch {
            asset: normalized,
            rules: std::iter::once(first)
                .chain(rest)
                .map(|rule| rule.name.clone())
                .collect(),
        })
    }
}

impl PartialEq for LoaderTable {
    fn eq(&self, other: &Self) -> bool {
        self.rules == other.rules
    }
}

impl Serialize for LoaderTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.rules.serialize(serializer)
    }
}

fn to_strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Loader rules for `mode` with the default extension classes.
pub fn build_loader_rules(mode: BuildMode) -> Result<LoaderTable> {
    build_loader_rules_with(mode, &[])
}

/// Loader rules for `mode`, adding `extra_asset_extensions` to the binary class.
///
/// An extra extension already claimed by the script or style rule makes the
/// table ambiguous and is rejected.
pub fn build_loader_rules_with(
    mode: BuildMode,
    extra_asset_extensions: &[String],
) -> Result<LoaderTable> {
    let scripts = LoaderRule::new(AssetClass::Script, &to_strings(SCRIPT_EXTENSIONS), false)
        .exclude(Exclusion {
            pattern: "node_modules".to_string(),
            unless: Some("node_modules/mock-block-dock".to_string()),
        })
        .stage(
            TransformStage::new(StageKind::ScriptTranspile).with_options(json!({
                "presets": ["@babel/preset-env", "@babel/preset-react"]
            })),
        );

    let style_output = match mode {
        BuildMode::Production => TransformStage::new(StageKind::StyleExtract)
            .with_options(json!({ "filename": "style.[contenthash].css" })),
        BuildMode::Development => TransformStage::new(StageKind::StyleInject),
    };
    let styles = LoaderRule::new(AssetClass::Style, &to_strings(STYLE_EXTENSIONS), false)
        .stage(
            TransformStage::new(StageKind::StylePreprocess)
                .with_options(json!({ "implementation": "sass" })),
        )
        .stage(style_output);

    let mut binary_extensions = to_strings(BINARY_EXTENSIONS);
    for ext in extra_asset_extensions {
        let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        if ext.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "assetExtensions".to_string(),
                value: String::new(),
                hint: "extensions cannot be empty".to_string(),
            });
        }
        if !binary_extensions.contains(&ext) {
            binary_extensions.push(ext);
        }
    }

    let file_name = match mode {
        BuildMode::Production => "[name].[contenthash].[ext]",
        BuildMode::Development => "[name].[ext]",
    };
    let assets = LoaderRule::new(AssetClass::Binary, &binary_extensions, true).stage(
        TransformStage::new(StageKind::RawAssetCopy).with_options(json!({ "name": file_name })),
    );

    let table = LoaderTable::new(vec![scripts, styles, assets])?;
    debug!(%mode, rules = table.rules().len(), "loader rules built");
    Ok(table)
}
