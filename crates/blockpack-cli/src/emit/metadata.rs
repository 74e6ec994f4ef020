//! Build metadata summary written after every other plugin.

use std::path::PathBuf;

use blockpack_config::{BuildMode, BuildPlan};
use serde::{Deserialize, Serialize};

use crate::emit::artifacts::{Artifact, ArtifactSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMetadata {
    pub mode: BuildMode,
    pub entry: Option<PathBuf>,
    /// Module names the host must provide
    pub externals: Vec<String>,
    pub assets: Vec<Artifact>,
    pub plugins: Vec<String>,
}

impl BuildMetadata {
    /// Summarize `plan` and the final artifact set, leaving out `exclude`.
    pub fn collect(plan: &BuildPlan, artifacts: &ArtifactSet, exclude: &[&str]) -> Self {
        Self {
            mode: plan.mode(),
            entry: plan.entry_path().map(PathBuf::from),
            externals: plan.externals().iter().map(|(name, _)| name.to_string()).collect(),
            assets: artifacts
                .iter()
                .filter(|a| !exclude.contains(&a.name.as_str()))
                .cloned()
                .collect(),
            plugins: plan.plugin_names().into_iter().map(str::to_string).collect(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
