//! Asset manifest: logical name to emitted (possibly content-hashed) name.

use std::collections::BTreeMap;

use crate::emit::artifacts::ArtifactSet;
use crate::error::{CliError, Result};

/// Lowercase hex, at least eight digits: `[contenthash]` output.
fn is_hash_segment(segment: &str) -> bool {
    segment.len() >= 8
        && segment
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Drop content-hash segments from a file name.
///
/// `main.3f9a0c21.js` → `main.js`. A name that is only a hash plus an
/// extension has no logical name and is kept as is.
pub fn logical_name(name: &str) -> String {
    let (dir, file) = match name.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, name),
    };

    let segments: Vec<&str> = file.split('.').collect();
    let Some((extension, stem)) = segments.split_last() else {
        return name.to_string();
    };

    let kept: Vec<&str> = stem
        .iter()
        .copied()
        .filter(|segment| !is_hash_segment(segment))
        .collect();
    if kept.is_empty() || kept.len() == stem.len() {
        return name.to_string();
    }

    let file = format!("{}.{}", kept.join("."), extension);
    match dir {
        Some(dir) => format!("{dir}/{file}"),
        None => file,
    }
}

/// Build the manifest, leaving out the names in `exclude`.
///
/// Two emitted files with the same logical name (typically a stale bundle
/// left next to a fresh one) cannot both be addressed, so that is an error.
pub fn build_manifest(
    artifacts: &ArtifactSet,
    exclude: &[&str],
) -> Result<BTreeMap<String, String>> {
    let mut manifest = BTreeMap::new();

    for artifact in artifacts
        .iter()
        .filter(|artifact| !exclude.contains(&artifact.name.as_str()))
    {
        let logical = logical_name(&artifact.name);
        if let Some(existing) = manifest.get(&logical) {
            return Err(CliError::Emit {
                path: artifacts.root().join(&logical),
                message: format!(
                    "'{existing}' and '{}' both map to '{logical}'; remove stale output and rebuild",
                    artifact.name
                ),
            });
        }
        manifest.insert(logical, artifact.name.clone());
    }

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_logical_name_strips_hash() {
        assert_eq!(logical_name("main.3f9a0c21.js"), "main.js");
        assert_eq!(logical_name("style.0123456789abcdef.css"), "style.css");
        assert_eq!(logical_name("public/img/logo.deadbeef.png"), "public/img/logo.png");
    }

    #[test]
    fn test_logical_name_keeps_plain_names() {
        assert_eq!(logical_name("main.js"), "main.js");
        assert_eq!(logical_name("block-schema.json"), "block-schema.json");
        assert_eq!(logical_name("d41d8cd98f00b204.png"), "d41d8cd98f00b204.png");
        assert_eq!(logical_name("LICENSE"), "LICENSE");
    }

    #[test]
    fn test_manifest_keys_by_logical_name() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.3f9a0c21.js"), "").unwrap();
        fs::write(dir.path().join("logo.9e107d9d372bb682.png"), "").unwrap();
        fs::write(dir.path().join("manifest.json"), "{}").unwrap();

        let set = ArtifactSet::scan(dir.path()).unwrap();
        let manifest = build_manifest(&set, &["manifest.json"]).unwrap();
        assert_eq!(
            manifest,
            BTreeMap::from([
                ("logo.png".to_string(), "logo.9e107d9d372bb682.png".to_string()),
                ("main.js".to_string(), "main.3f9a0c21.js".to_string()),
            ])
        );
    }

    #[test]
    fn test_duplicate_logical_name_names_both_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.3f9a0c21.js"), "").unwrap();
        fs::write(dir.path().join("main.aaaabbbb.js"), "").unwrap();

        let set = ArtifactSet::scan(dir.path()).unwrap();
        let err = build_manifest(&set, &[]).unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, CliError::Emit { .. }));
        assert!(msg.contains("main.3f9a0c21.js"));
        assert!(msg.contains("main.aaaabbbb.js"));
    }
}
