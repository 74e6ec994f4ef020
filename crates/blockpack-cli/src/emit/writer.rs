//! Writing post-emit files into the output tree.
//!
//! Every target is validated to stay inside its base directory, and each
//! file is written to a temporary sibling first and renamed into place so a
//! reader never observes a partial file.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use walkdir::WalkDir;

use crate::error::{CliError, Result};

const TEMP_SUFFIX: &str = ".blockpack-tmp";

fn emit_error(path: &Path, message: impl Into<String>) -> CliError {
    CliError::Emit {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

/// Join `relative` onto `base_dir`, rejecting anything that escapes it.
pub fn output_path(base_dir: &Path, relative: &Path) -> Result<PathBuf> {
    let base = base_dir.clean();
    let full = base.join(relative).clean();

    if !full.starts_with(&base) {
        return Err(emit_error(
            &full,
            format!("path escapes output directory '{}'", base.display()),
        ));
    }
    Ok(full)
}

/// Write `contents` to `target`, creating parent directories.
pub fn write_file(target: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| emit_error(parent, format!("failed to create directory: {e}")))?;
    }

    let mut temp = target.as_os_str().to_owned();
    temp.push(TEMP_SUFFIX);
    let temp = PathBuf::from(temp);

    fs::write(&temp, contents).map_err(|e| emit_error(target, e.to_string()))?;
    fs::rename(&temp, target).map_err(|e| {
        let _ = fs::remove_file(&temp);
        emit_error(target, format!("failed to move into place: {e}"))
    })
}

/// Copy a file, or a directory's contents, into `to_dir`.
///
/// Returns the written paths in walk order.
pub fn copy_into(from: &Path, to_dir: &Path) -> Result<Vec<PathBuf>> {
    if !from.exists() {
        return Err(CliError::FileNotFound(from.to_path_buf()));
    }

    if from.is_file() {
        let name = from
            .file_name()
            .ok_or_else(|| emit_error(from, "source has no file name"))?;
        let target = to_dir.join(name);
        copy_file(from, &target)?;
        return Ok(vec![target]);
    }

    let mut written = Vec::new();
    for entry in WalkDir::new(from).sort_by_file_name() {
        let entry = entry.map_err(|e| emit_error(from, e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| emit_error(entry.path(), e.to_string()))?;
        let target = output_path(to_dir, relative)?;
        copy_file(entry.path(), &target)?;
        written.push(target);
    }
    Ok(written)
}

fn copy_file(from: &Path, target: &Path) -> Result<()> {
    let contents = fs::read(from).map_err(|e| emit_error(from, e.to_string()))?;
    write_file(target, &contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_path_rejects_traversal() {
        let base = Path::new("/project/dist/out");
        assert!(output_path(base, Path::new("../../etc/passwd")).is_err());
        assert_eq!(
            output_path(base, Path::new("public/./logo.png")).unwrap(),
            PathBuf::from("/project/dist/out/public/logo.png")
        );
    }

    #[test]
    fn test_write_file_creates_parents_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a/b/manifest.json");
        write_file(&target, b"{}").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "{}");
        let leftovers: Vec<_> = fs::read_dir(dir.path().join("a/b"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(TEMP_SUFFIX))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_copy_into_copies_directory_contents() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("public");
        fs::create_dir_all(src.join("img")).unwrap();
        fs::write(src.join("img/logo.png"), [0u8; 4]).unwrap();
        fs::write(src.join("robots.txt"), "User-agent: *").unwrap();

        let out = dir.path().join("out/public");
        let written = copy_into(&src, &out).unwrap();

        assert_eq!(written, vec![out.join("img/logo.png"), out.join("robots.txt")]);
        assert_eq!(fs::read(out.join("img/logo.png")).unwrap().len(), 4);
    }

    #[test]
    fn test_copy_into_missing_source() {
        let dir = TempDir::new().unwrap();
        let err = copy_into(&dir.path().join("nope"), dir.path()).unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }
}
