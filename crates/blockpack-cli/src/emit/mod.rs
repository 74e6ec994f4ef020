//! Post-emit plugin execution.
//!
//! After the external bundler has written its output, the plan's plugins
//! run here in pipeline order. The metadata emitter is always last, so the
//! summary it writes lists the manifest and entry page as well.

pub mod artifacts;
pub mod manifest;
pub mod metadata;
pub mod template;
pub mod writer;

use std::fs;
use std::path::{Path, PathBuf};

use blockpack_config::{BuildPlan, PluginOptions};
use tracing::debug;

use crate::error::{Result, ResultExt};

pub use artifacts::{Artifact, ArtifactSet, WORK_DIR};
pub use manifest::{build_manifest, logical_name};
pub use metadata::BuildMetadata;
pub use template::inject_scripts;

/// Files produced by the post-emit plugins.
#[derive(Debug, Default)]
pub struct EmitReport {
    /// Files copied by the static-copy plugin
    pub copied: Vec<PathBuf>,
    /// Files generated (manifest, entry page, metadata), in write order
    pub generated: Vec<PathBuf>,
    /// Output directory contents once every plugin has run
    pub artifacts: ArtifactSet,
}

/// `path` relative to `root` as a `/`-separated name, if it lies inside.
fn name_in(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    Some(
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
    )
}

/// Run every plugin of `plan` against its output directory.
pub fn run_plugins(plan: &BuildPlan) -> Result<EmitReport> {
    let output_dir = plan.output_dir();
    let mut report = EmitReport::default();

    let metadata_name = plan.plugins().iter().find_map(|plugin| match &plugin.options {
        PluginOptions::BuildMetadata { output } => name_in(output_dir, output),
        _ => None,
    });

    for plugin in plan.plugins() {
        debug!(plugin = plugin.name.name(), "running plugin");

        match &plugin.options {
            PluginOptions::StaticCopy { patterns } => {
                for pattern in patterns {
                    let target = writer::output_path(output_dir, &pattern.to)?;
                    report.copied.extend(writer::copy_into(&pattern.from, &target)?);
                }
            }
            PluginOptions::AssetManifest { output } => {
                let artifacts = ArtifactSet::scan(output_dir)?;
                let mut exclude = vec![output.as_str()];
                exclude.extend(metadata_name.as_deref());

                let manifest = build_manifest(&artifacts, &exclude)?;
                let target = writer::output_path(output_dir, Path::new(output))?;
                writer::write_file(&target, serde_json::to_string_pretty(&manifest)?.as_bytes())?;
                report.generated.push(target);
            }
            PluginOptions::HtmlTemplate { template, filename } => {
                let source = fs::read_to_string(template)
                    .with_path(template)
                    .with_hint("Check the 'htmlTemplate' field")?;
                let artifacts = ArtifactSet::scan(output_dir)?;
                let scripts: Vec<&str> =
                    artifacts.entry_scripts().map(|a| a.name.as_str()).collect();

                let target = writer::output_path(output_dir, Path::new(filename))?;
                writer::write_file(&target, inject_scripts(&source, &scripts).as_bytes())?;
                report.generated.push(target);
            }
            PluginOptions::HotModuleReplacement => {
                debug!("hot-module replacement is provided by the dev server; nothing to emit");
            }
            PluginOptions::BuildMetadata { output } => {
                let artifacts = ArtifactSet::scan(output_dir)?;
                let exclude: Vec<&str> = metadata_name.as_deref().into_iter().collect();
                let metadata = BuildMetadata::collect(plan, &artifacts, &exclude);

                writer::write_file(output, metadata.to_json_pretty()?.as_bytes())?;
                report.generated.push(output.clone());
            }
        }
    }

    report.artifacts = ArtifactSet::scan(output_dir)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpack_config::{resolve_plan, AssetClass, BuildMode, ResolveInputs};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("dist/build")).unwrap();
        fs::write(root.join("dist/build/Block.fs.js"), "export {};").unwrap();
        fs::write(root.join("dist/build/Dev.fs.js"), "export {};").unwrap();
        fs::create_dir_all(root.join("public/img")).unwrap();
        fs::write(root.join("public/img/logo.svg"), "<svg/>").unwrap();
        fs::create_dir_all(root.join("block-info")).unwrap();
        fs::write(root.join("block-info/block.json"), "{}").unwrap();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(
            root.join("src/index.html"),
            "<html>\n  <body>\n    <div id=\"root\"></div>\n  </body>\n</html>\n",
        )
        .unwrap();
        dir
    }

    fn bundler_output(root: &Path, files: &[&str]) {
        let out = root.join("dist/out");
        fs::create_dir_all(&out).unwrap();
        for file in files {
            fs::write(out.join(file), "/* bundle */").unwrap();
        }
    }

    #[test]
    fn production_plugins_copy_then_manifest_then_metadata() {
        let dir = project();
        let plan = resolve_plan(BuildMode::Production, &ResolveInputs::new(dir.path())).unwrap();
        bundler_output(dir.path(), &["main.3f9a0c21.js"]);

        let report = run_plugins(&plan).unwrap();
        let out = dir.path().join("dist/out");

        assert!(out.join("public/img/logo.svg").is_file());
        assert!(out.join("block.json").is_file());
        assert_eq!(report.copied.len(), 2);
        assert_eq!(
            report.generated,
            vec![out.join("manifest.json"), out.join("block-metadata.json")]
        );

        let manifest: BTreeMap<String, String> =
            serde_json::from_str(&fs::read_to_string(out.join("manifest.json")).unwrap()).unwrap();
        assert_eq!(manifest.get("main.js").map(String::as_str), Some("main.3f9a0c21.js"));
        assert!(!manifest.contains_key("manifest.json"));
        assert!(!manifest.contains_key("block-metadata.json"));

        let metadata: BuildMetadata = serde_json::from_str(
            &fs::read_to_string(out.join("block-metadata.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(metadata.mode, BuildMode::Production);
        assert_eq!(
            metadata.plugins,
            vec!["static-copy", "asset-manifest", "build-metadata"]
        );
        let names: Vec<&str> = metadata.assets.iter().map(|a| a.name.as_str()).collect();
        assert!(names.contains(&"manifest.json"));
        assert!(!names.contains(&"block-metadata.json"));

        assert!(report.artifacts.contains("block-metadata.json"));
    }

    #[test]
    fn hashed_image_keeps_its_logical_name() {
        let dir = project();
        let plan = resolve_plan(BuildMode::Production, &ResolveInputs::new(dir.path())).unwrap();
        let image_rule = plan.loader_rules().rule(AssetClass::Binary).unwrap();
        assert_eq!(image_rule.stages[0].options["name"], "[name].[contenthash].[ext]");

        bundler_output(dir.path(), &["main.3f9a0c21.js", "logo.9e107d9d372bb682.png"]);
        run_plugins(&plan).unwrap();

        let out = dir.path().join("dist/out");
        let manifest: BTreeMap<String, String> =
            serde_json::from_str(&fs::read_to_string(out.join("manifest.json")).unwrap()).unwrap();
        assert_eq!(
            manifest.get("logo.png").map(String::as_str),
            Some("logo.9e107d9d372bb682.png")
        );
    }

    #[test]
    fn stale_bundle_next_to_fresh_one_fails_the_manifest() {
        let dir = project();
        let plan = resolve_plan(BuildMode::Production, &ResolveInputs::new(dir.path())).unwrap();
        bundler_output(dir.path(), &["main.3f9a0c21.js", "main.aaaabbbb.js"]);

        let err = run_plugins(&plan).unwrap_err();
        assert!(err.to_string().contains("main.aaaabbbb.js"));
        assert!(!dir.path().join("dist/out/manifest.json").exists());
    }

    #[test]
    fn development_page_loads_entry_bundle() {
        let dir = project();
        let plan = resolve_plan(BuildMode::Development, &ResolveInputs::new(dir.path())).unwrap();
        bundler_output(dir.path(), &["main.js", "main.abcdef12.hot-update.js"]);

        let report = run_plugins(&plan).unwrap();
        let out = dir.path().join("dist/out");

        let page = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(page.contains(r#"<script defer src="main.js"></script>"#));
        assert!(!page.contains("hot-update"));
        assert!(!out.join("manifest.json").exists());

        // Development metadata lives next to the build tree, not in the output
        let metadata_path = dir.path().join("dist/build/block-metadata.json");
        assert_eq!(report.generated.last(), Some(&metadata_path));
        let metadata: BuildMetadata =
            serde_json::from_str(&fs::read_to_string(metadata_path).unwrap()).unwrap();
        assert!(metadata.externals.is_empty());
        assert!(metadata.assets.iter().any(|a| a.name == "index.html"));
    }

    #[test]
    fn missing_template_is_reported_with_hint() {
        let dir = project();
        let plan = resolve_plan(BuildMode::Development, &ResolveInputs::new(dir.path())).unwrap();
        fs::remove_file(dir.path().join("src/index.html")).unwrap();

        let err = run_plugins(&plan).unwrap_err();
        assert!(err.to_string().contains("htmlTemplate"));
    }

    #[test]
    fn name_in_is_slash_separated() {
        let root = Path::new("/tmp/out");
        assert_eq!(
            name_in(root, &root.join("a").join("b.json")).as_deref(),
            Some("a/b.json")
        );
        assert_eq!(name_in(root, Path::new("/elsewhere/b.json")), None);
    }
}
