//! The set of files a bundler left in the output directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{CliError, Result};

/// Directory inside the output tree holding blockpack's own working files.
pub const WORK_DIR: &str = ".blockpack";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Path relative to the output directory, `/`-separated
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    root: PathBuf,
    artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    /// List every file under `root`, sorted by name.
    ///
    /// A missing directory is an empty set; blockpack's work directory is skipped.
    pub fn scan(root: &Path) -> Result<Self> {
        let mut artifacts = Vec::new();

        if root.is_dir() {
            let walker = WalkDir::new(root)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| entry.depth() != 1 || entry.file_name() != WORK_DIR);

            for entry in walker {
                let entry = entry.map_err(|e| CliError::Emit {
                    path: root.to_path_buf(),
                    message: e.to_string(),
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }

                let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                let size = entry
                    .metadata()
                    .map_err(|e| CliError::Emit {
                        path: entry.path().to_path_buf(),
                        message: e.to_string(),
                    })?
                    .len();
                artifacts.push(Artifact { name, size });
            }
        }

        artifacts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self {
            root: root.to_path_buf(),
            artifacts,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.artifacts.iter().any(|a| a.name == name)
    }

    /// Top-level script bundles, the ones an entry page loads.
    pub fn entry_scripts(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts
            .iter()
            .filter(|a| !a.name.contains('/') && a.name.ends_with(".js"))
            .filter(|a| !a.name.contains(".hot-update."))
    }

    /// `(name, size)` pairs for summaries.
    pub fn summary(&self) -> Vec<(String, u64)> {
        self.artifacts
            .iter()
            .map(|a| (a.name.clone(), a.size))
            .collect()
    }
}
