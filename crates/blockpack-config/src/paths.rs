//! Declared path table and its resolution to absolute locations.
//!
//! Paths are declared per logical name, optionally restricted to one mode,
//! so production and development can point the same logical name (e.g. the
//! entry module) at different files without any call site branching on mode.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::mode::{Applicability, BuildMode};

/// Logical names the rest of the resolver refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogicalPath {
    /// Entry module handed to the bundler
    Entry,
    /// Directory the bundle is emitted into
    OutputDir,
    /// Static assets: copied in production, served in development
    AssetsDir,
    /// Block metadata directory copied next to the bundle
    BlockInfo,
    /// HTML page template for the development harness
    HtmlTemplate,
    /// Where the build-metadata emitter writes its summary
    MetadataOutput,
    /// Environment file injected at build time
    EnvFile,
}

impl LogicalPath {
    pub const ALL: [LogicalPath; 7] = [
        LogicalPath::Entry,
        LogicalPath::OutputDir,
        LogicalPath::AssetsDir,
        LogicalPath::BlockInfo,
        LogicalPath::HtmlTemplate,
        LogicalPath::MetadataOutput,
        LogicalPath::EnvFile,
    ];

    /// Field name used in configuration and error messages.
    pub fn field(self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::OutputDir => "outputDir",
            Self::AssetsDir => "assetsDir",
            Self::BlockInfo => "blockInfo",
            Self::HtmlTemplate => "htmlTemplate",
            Self::MetadataOutput => "metadataOutput",
            Self::EnvFile => "envFile",
        }
    }

    /// Whether a build in `mode` cannot proceed without this path.
    pub fn required_in(self, mode: BuildMode) -> bool {
        match self {
            Self::Entry | Self::OutputDir | Self::AssetsDir | Self::MetadataOutput => true,
            Self::BlockInfo => mode == BuildMode::Production,
            Self::HtmlTemplate => mode == BuildMode::Development,
            Self::EnvFile => false,
        }
    }

    /// Whether the path must already exist on disk. Outputs are created later.
    pub fn must_exist(self) -> bool {
        match self {
            Self::Entry | Self::AssetsDir | Self::BlockInfo | Self::HtmlTemplate => true,
            Self::OutputDir | Self::MetadataOutput | Self::EnvFile => false,
        }
    }
}

/// One row of the declared path table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredPath {
    pub name: LogicalPath,
    pub applies: Applicability,
    pub path: PathBuf,
}

/// Declared logical paths, relative to the project base directory or absolute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredPaths {
    entries: Vec<DeclaredPath>,
}

impl DeclaredPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a path used by both modes.
    pub fn declare(self, name: LogicalPath, path: impl Into<PathBuf>) -> Self {
        self.declare_for(name, Applicability::Both, path)
    }

    /// Declare a path used only by the given modes.
    pub fn declare_for(
        mut self,
        name: LogicalPath,
        applies: Applicability,
        path: impl Into<PathBuf>,
    ) -> Self {
        self.entries.push(DeclaredPath {
            name,
            applies,
            path: path.into(),
        });
        self
    }

    /// The standard block project layout.
    ///
    /// The production entry is the library module; development serves a
    /// harness entry and writes its metadata into the build tree instead of
    /// the output directory.
    pub fn block_defaults() -> Self {
        Self::new()
            .declare_for(
                LogicalPath::Entry,
                Applicability::Production,
                "./dist/build/Block.fs.js",
            )
            .declare_for(
                LogicalPath::Entry,
                Applicability::Development,
                "./dist/build/Dev.fs.js",
            )
            .declare(LogicalPath::OutputDir, "./dist/out")
            .declare(LogicalPath::AssetsDir, "./public")
            .declare(LogicalPath::BlockInfo, "./block-info")
            .declare_for(
                LogicalPath::HtmlTemplate,
                Applicability::Development,
                "./src/index.html",
            )
            .declare_for(
                LogicalPath::MetadataOutput,
                Applicability::Production,
                "./dist/out/block-metadata.json",
            )
            .declare_for(
                LogicalPath::MetadataOutput,
                Applicability::Development,
                "./dist/build/block-metadata.json",
            )
            .declare(LogicalPath::EnvFile, "./.env")
    }
}

/// Resolved absolute paths for one build mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPaths {
    mode: BuildMode,
    paths: BTreeMap<LogicalPath, PathBuf>,
}

impl AssetPaths {
    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn get(&self, name: LogicalPath) -> Option<&Path> {
        self.paths.get(&name).map(PathBuf::as_path)
    }

    /// Look up a path a later component depends on.
    pub fn require(&self, name: LogicalPath) -> Result<&Path> {
        self.get(name).ok_or_else(|| ConfigError::UndeclaredPath {
            field: name.field().to_string(),
            mode: self.mode,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (LogicalPath, &Path)> {
        self.paths.iter().map(|(name, path)| (*name, path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Resolve `path` against `base_dir` unless it is already absolute.
pub fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf().clean()
    } else {
        base_dir.join(path).clean()
    }
}

/// Resolve the declared table for `mode` into absolute paths.
///
/// Fails with [`ConfigError::MissingPath`] when a path the mode needs does not
/// exist, [`ConfigError::UndeclaredPath`] when it was never declared, and
/// [`ConfigError::AmbiguousPath`] when two rows apply to the same mode.
pub fn resolve_asset_paths(
    mode: BuildMode,
    declared: &DeclaredPaths,
    base_dir: &Path,
) -> Result<AssetPaths> {
    let mut paths = BTreeMap::new();

    for name in LogicalPath::ALL {
        let mut candidates = declared
            .entries
            .iter()
            .filter(|row| row.name == name && row.applies.applies_to(mode));

        let Some(row) = candidates.next() else {
            if name.required_in(mode) {
                return Err(ConfigError::UndeclaredPath {
                    field: name.field().to_string(),
                    mode,
                });
            }
            continue;
        };

        if candidates.next().is_some() {
            return Err(ConfigError::AmbiguousPath {
                field: name.field().to_string(),
                mode,
            });
        }

        let resolved = resolve_path(&row.path, base_dir);
        if name.must_exist() && name.required_in(mode) && !resolved.exists() {
            return Err(ConfigError::MissingPath {
                field: name.field().to_string(),
                path: resolved,
            });
        }

        debug!(field = name.field(), path = %resolved.display(), "resolved path");
        paths.insert(name, resolved);
    }

    Ok(AssetPaths { mode, paths })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn production_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("dist/build")).unwrap();
        fs::write(dir.path().join("dist/build/Block.fs.js"), "export {};").unwrap();
        fs::create_dir_all(dir.path().join("public")).unwrap();
        fs::create_dir_all(dir.path().join("block-info")).unwrap();
        dir
    }

    #[test]
    fn production_selects_library_entry() {
        let dir = production_project();
        let paths =
            resolve_asset_paths(BuildMode::Production, &DeclaredPaths::block_defaults(), dir.path())
                .unwrap();

        assert_eq!(
            paths.get(LogicalPath::Entry).unwrap(),
            dir.path().join("dist/build/Block.fs.js")
        );
        assert_eq!(
            paths.get(LogicalPath::MetadataOutput).unwrap(),
            dir.path().join("dist/out/block-metadata.json")
        );
        assert!(paths.get(LogicalPath::HtmlTemplate).is_none());
    }

    #[test]
    fn missing_entry_is_reported_with_field() {
        let dir = TempDir::new().unwrap();
        let err =
            resolve_asset_paths(BuildMode::Production, &DeclaredPaths::block_defaults(), dir.path())
                .unwrap_err();

        match err {
            ConfigError::MissingPath { field, path } => {
                assert_eq!(field, "entry");
                assert!(path.ends_with("dist/build/Block.fs.js"));
            }
            other => panic!("expected MissingPath, got {other:?}"),
        }
    }

    #[test]
    fn undeclared_required_path_fails() {
        let dir = production_project();
        let declared = DeclaredPaths::new().declare(LogicalPath::Entry, "dist/build/Block.fs.js");
        let err = resolve_asset_paths(BuildMode::Production, &declared, dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UndeclaredPath { ref field, .. } if field == "outputDir"));
    }

    #[test]
    fn two_rows_for_one_mode_are_ambiguous() {
        let dir = production_project();
        let declared = DeclaredPaths::block_defaults().declare(LogicalPath::OutputDir, "other");
        let err = resolve_asset_paths(BuildMode::Production, &declared, dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousPath { ref field, .. } if field == "outputDir"));
    }

    #[test]
    fn absolute_paths_are_kept_and_cleaned() {
        let base = Path::new("/project");
        assert_eq!(
            resolve_path(Path::new("/srv/./assets/../public"), base),
            PathBuf::from("/srv/public")
        );
        assert_eq!(
            resolve_path(Path::new("./dist/out"), base),
            PathBuf::from("/project/dist/out")
        );
    }

    #[test]
    fn optional_env_file_need_not_exist() {
        let dir = production_project();
        let paths =
            resolve_asset_paths(BuildMode::Production, &DeclaredPaths::block_defaults(), dir.path())
                .unwrap();
        assert_eq!(
            paths.get(LogicalPath::EnvFile).unwrap(),
            dir.path().join(".env")
        );
    }
}
