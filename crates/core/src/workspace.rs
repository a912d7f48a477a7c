//! Locating the workspace root.

use std::path::{Path, PathBuf};

use log::debug;

use crate::config::WORKSPACE_MANIFEST_FILENAME;
use crate::error::{Error, Result};

/// Common misspelling that pnpm refuses to treat as a manifest.
const INVALID_MANIFEST_FILENAME: &str = "pnpm-workspace.yml";

/// Finds the workspace root by walking up from `start`.
///
/// When `override_dir` is set it is returned as-is, mirroring how pnpm treats
/// `NPM_CONFIG_WORKSPACE_DIR`.
///
/// # Errors
///
/// Returns [`Error::WorkspaceNotFound`] when no ancestor contains
/// `pnpm-workspace.yaml`, or [`Error::BadWorkspaceManifestName`] when a
/// directory holds the misnamed `pnpm-workspace.yml` instead.
pub fn find_workspace_dir(start: &Path, override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        debug!("Using forced workspace directory `{}`", dir.display());
        return absolute(dir);
    }

    let start = absolute(start)?;

    for dir in start.ancestors() {
        if dir.join(WORKSPACE_MANIFEST_FILENAME).is_file() {
            debug!("Workspace root: `{}`", dir.display());
            return Ok(dir.to_path_buf());
        }

        let misnamed = dir.join(INVALID_MANIFEST_FILENAME);
        if misnamed.is_file() {
            return Err(Error::BadWorkspaceManifestName(misnamed));
        }
    }

    Err(Error::WorkspaceNotFound { start })
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    Ok(std::env::current_dir()?.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_finds_manifest_in_start_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(WORKSPACE_MANIFEST_FILENAME), "packages: []\n").unwrap();

        let root = find_workspace_dir(dir.path(), None).unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn test_finds_manifest_in_ancestor() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(WORKSPACE_MANIFEST_FILENAME), "").unwrap();
        let nested = dir.path().join("packages").join("app").join("src");
        fs::create_dir_all(&nested).unwrap();

        let root = find_workspace_dir(&nested, None).unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn test_closest_manifest_wins() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(WORKSPACE_MANIFEST_FILENAME), "").unwrap();
        let inner = dir.path().join("inner");
        fs::create_dir_all(&inner).unwrap();
        fs::write(inner.join(WORKSPACE_MANIFEST_FILENAME), "").unwrap();

        let root = find_workspace_dir(&inner, None).unwrap();
        assert_eq!(root, inner);
    }

    #[test]
    fn test_missing_manifest_is_an_error() {
        let dir = TempDir::new().unwrap();

        let result = find_workspace_dir(dir.path(), None);
        assert!(matches!(result, Err(Error::WorkspaceNotFound { .. })));
    }

    #[test]
    fn test_misnamed_manifest_is_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(INVALID_MANIFEST_FILENAME), "").unwrap();

        let result = find_workspace_dir(dir.path(), None);
        assert!(matches!(result, Err(Error::BadWorkspaceManifestName(_))));
    }

    #[test]
    fn test_override_skips_search() {
        let dir = TempDir::new().unwrap();
        let forced = dir.path().join("somewhere");

        let root = find_workspace_dir(dir.path(), Some(&forced)).unwrap();
        assert_eq!(root, forced);
    }
}
