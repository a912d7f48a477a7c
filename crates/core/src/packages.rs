//! Workspace package discovery.
//!
//! [`PackageSource`] is the seam the rest of the crate depends on;
//! [`WorkspacePackageSource`] is the default implementation, which reads the
//! `package.json` of every directory matched by the manifest's `packages`
//! globs.

use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use log::{debug, warn};
use serde::Deserialize;
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};
use crate::manifest::WorkspaceManifest;

const PACKAGE_JSON_FILENAME: &str = "package.json";
const NODE_MODULES: &str = "node_modules";

/// A package found in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    pub name: String,
    pub version: Option<String>,
    pub root_dir: PathBuf,
    /// Names of every declared dependency, of any kind.
    pub dependencies: Vec<String>,
}

impl PackageDescriptor {
    /// Directory of the package relative to the workspace root, `.` for the root itself.
    #[must_use]
    pub fn relative_dir(&self, workspace_root: &Path) -> PathBuf {
        match self.root_dir.strip_prefix(workspace_root) {
            Ok(relative) if relative.as_os_str().is_empty() => PathBuf::from("."),
            Ok(relative) => relative.to_path_buf(),
            Err(_) => self.root_dir.clone(),
        }
    }
}

impl Display for PackageDescriptor {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(version) => write!(formatter, "{}@{}", self.name, version),
            None => formatter.write_str(&self.name),
        }
    }
}

/// Lists the packages of a workspace.
pub trait PackageSource {
    /// Returns every named package in the workspace, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace cannot be read.
    fn list_packages(&self, workspace_root: &Path) -> Result<Vec<PackageDescriptor>>;
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    dependencies: HashMap<String, serde_json::Value>,
    #[serde(default)]
    dev_dependencies: HashMap<String, serde_json::Value>,
    #[serde(default)]
    optional_dependencies: HashMap<String, serde_json::Value>,
    #[serde(default)]
    peer_dependencies: HashMap<String, serde_json::Value>,
}

impl PackageJson {
    fn dependency_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names: Vec<String> = [
            &self.dependencies,
            &self.dev_dependencies,
            &self.optional_dependencies,
            &self.peer_dependencies,
        ]
        .into_iter()
        .flat_map(HashMap::keys)
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect();

        names.sort();
        names
    }
}

/// Globs pnpm uses when the manifest has no `packages` key.
pub const DEFAULT_PACKAGE_PATTERNS: [&str; 2] = [".", "**"];

/// Discovers packages from the `packages` globs of `pnpm-workspace.yaml`.
#[derive(Debug, Clone)]
pub struct WorkspacePackageSource {
    includes: GlobSet,
    excludes: GlobSet,
}

impl WorkspacePackageSource {
    /// Compiles the manifest's package globs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Glob`] if any pattern is not a valid glob.
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut includes = GlobSetBuilder::new();
        let mut excludes = GlobSetBuilder::new();

        for pattern in patterns {
            match pattern.strip_prefix('!') {
                Some(excluded) => {
                    excludes.add(compile_glob(excluded)?);
                }
                None => {
                    includes.add(compile_glob(pattern)?);
                }
            }
        }

        Ok(Self {
            includes: build_globset(includes)?,
            excludes: build_globset(excludes)?,
        })
    }

    /// Compiles the manifest's package globs, falling back to every
    /// directory of the workspace when it lists none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Glob`] if any pattern is not a valid glob.
    pub fn for_manifest(manifest: &WorkspaceManifest) -> Result<Self> {
        match &manifest.packages {
            Some(patterns) => Self::new(patterns),
            None => {
                debug!("No `packages` in the workspace manifest, searching every directory");
                Self::new(&DEFAULT_PACKAGE_PATTERNS.map(String::from))
            }
        }
    }

    fn is_package_dir(&self, relative: &str) -> bool {
        self.includes.is_match(relative) && !self.excludes.is_match(relative)
    }
}

fn normalize_pattern(pattern: &str) -> &str {
    let pattern = pattern.trim();
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    pattern.strip_suffix('/').unwrap_or(pattern)
}

fn compile_glob(pattern: &str) -> Result<globset::Glob> {
    let pattern = normalize_pattern(pattern);
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| Error::Glob(pattern.to_string(), e))
}

fn build_globset(builder: GlobSetBuilder) -> Result<GlobSet> {
    builder
        .build()
        .map_err(|e| Error::Glob("<workspace packages>".to_string(), e))
}

fn is_walkable(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return true;
    }

    let name = entry.file_name().to_string_lossy();
    entry.file_type().is_dir() && name != NODE_MODULES && !name.starts_with('.')
}

/// Path relative to the root with `/` separators, as globs expect.
fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// Reads a single `package.json`, returning `None` for packages without a name.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid JSON.
pub fn read_package(package_dir: &Path) -> Result<Option<PackageDescriptor>> {
    let path = package_dir.join(PACKAGE_JSON_FILENAME);
    let content =
        fs::read_to_string(&path).map_err(|e| Error::io_error("package manifest", &path, e))?;
    let package_json: PackageJson = serde_json::from_str(&content)
        .map_err(|e| Error::json_error("reading", "package manifest", &path, e))?;

    let Some(name) = package_json.name.clone().filter(|name| !name.is_empty()) else {
        debug!("Skipping unnamed package at `{}`", package_dir.display());
        return Ok(None);
    };

    Ok(Some(PackageDescriptor {
        name,
        version: package_json.version.clone(),
        root_dir: package_dir.to_path_buf(),
        dependencies: package_json.dependency_names(),
    }))
}

impl PackageSource for WorkspacePackageSource {
    fn list_packages(&self, workspace_root: &Path) -> Result<Vec<PackageDescriptor>> {
        let mut packages = Vec::new();

        if workspace_root.join(PACKAGE_JSON_FILENAME).is_file() {
            packages.extend(read_package(workspace_root)?);
        }

        let walker = WalkDir::new(workspace_root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(is_walkable);

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable directory: {e}");
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let Some(relative) = relative_slash_path(workspace_root, entry.path()) else {
                continue;
            };

            if self.is_package_dir(&relative) && entry.path().join(PACKAGE_JSON_FILENAME).is_file()
            {
                packages.extend(read_package(entry.path())?);
            }
        }

        packages.sort_by(|a, b| a.name.cmp(&b.name));

        if let Some(duplicate) = packages
            .windows(2)
            .find(|pair| pair[0].name == pair[1].name)
        {
            return Err(Error::DuplicatePackageName(duplicate[0].name.clone()));
        }

        debug!("Found {} workspace packages", packages.len());
        Ok(packages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_package(root: &Path, dir: &str, json: &str) {
        let package_dir = root.join(dir);
        fs::create_dir_all(&package_dir).unwrap();
        fs::write(package_dir.join(PACKAGE_JSON_FILENAME), json).unwrap();
    }

    fn names(packages: &[PackageDescriptor]) -> Vec<&str> {
        packages.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_lists_packages_matching_globs() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_package(root, ".", r#"{"name": "monorepo", "private": true}"#);
        write_package(root, "packages/b", r#"{"name": "pkg-b", "version": "1.0.0"}"#);
        write_package(root, "packages/a", r#"{"name": "pkg-a", "version": "2.1.0"}"#);
        write_package(root, "apps/web", r#"{"name": "web"}"#);
        write_package(root, "packages/a/fixtures/inner", r#"{"name": "fixture"}"#);

        let source = WorkspacePackageSource::new(&["packages/*".to_string()]).unwrap();
        let packages = source.list_packages(root).unwrap();

        assert_eq!(names(&packages), vec!["monorepo", "pkg-a", "pkg-b"]);
        assert_eq!(packages[1].version.as_deref(), Some("2.1.0"));
        assert_eq!(packages[1].relative_dir(root), PathBuf::from("packages/a"));
        assert_eq!(packages[0].relative_dir(root), PathBuf::from("."));
    }

    #[test]
    fn test_exclusion_globs_and_node_modules() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_package(root, "packages/a", r#"{"name": "pkg-a"}"#);
        write_package(root, "packages/test/fixture", r#"{"name": "fixture"}"#);
        write_package(root, "packages/a/node_modules/dep", r#"{"name": "dep"}"#);

        let source = WorkspacePackageSource::new(&[
            "./packages/**".to_string(),
            "!**/test/**".to_string(),
        ])
        .unwrap();
        let packages = source.list_packages(root).unwrap();

        assert_eq!(names(&packages), vec!["pkg-a"]);
    }

    #[test]
    fn test_manifest_without_packages_searches_everywhere() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_package(root, "packages/a", r#"{"name": "pkg-a"}"#);
        write_package(root, "tools/deep/cli", r#"{"name": "cli"}"#);
        write_package(root, "packages/a/node_modules/dep", r#"{"name": "dep"}"#);

        let source = WorkspacePackageSource::for_manifest(&WorkspaceManifest::default()).unwrap();
        let packages = source.list_packages(root).unwrap();

        assert_eq!(names(&packages), vec!["cli", "pkg-a"]);
    }

    #[test]
    fn test_unnamed_packages_are_skipped() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_package(root, "packages/a", r#"{"name": "pkg-a"}"#);
        write_package(root, "packages/unnamed", r#"{"private": true}"#);

        let source = WorkspacePackageSource::new(&["packages/*".to_string()]).unwrap();
        let packages = source.list_packages(root).unwrap();

        assert_eq!(names(&packages), vec!["pkg-a"]);
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_package(root, "packages/a", r#"{"name": "same"}"#);
        write_package(root, "packages/b", r#"{"name": "same"}"#);

        let source = WorkspacePackageSource::new(&["packages/*".to_string()]).unwrap();
        let result = source.list_packages(root);

        assert!(matches!(result, Err(Error::DuplicatePackageName(name)) if name == "same"));
    }

    #[test]
    fn test_dependency_names_are_collected() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_package(
            root,
            "packages/app",
            r#"{
                "name": "app",
                "dependencies": {"lib": "workspace:*", "react": "^18"},
                "devDependencies": {"lib": "workspace:*", "test-utils": "workspace:^"}
            }"#,
        );

        let package = read_package(&root.join("packages/app")).unwrap().unwrap();
        assert_eq!(package.dependencies, vec!["lib", "react", "test-utils"]);
    }

    #[test]
    fn test_invalid_package_json() {
        let dir = TempDir::new().unwrap();
        write_package(dir.path(), "broken", "{ not json");

        let result = read_package(&dir.path().join("broken"));
        assert!(matches!(result, Err(Error::Json { .. })));
    }

    #[test]
    fn test_invalid_glob() {
        let result = WorkspacePackageSource::new(&["packages/[".to_string()]);
        assert!(matches!(result, Err(Error::Glob(_, _))));
    }

    #[test]
    fn test_display() {
        let package = PackageDescriptor {
            name: "pkg-a".to_string(),
            version: Some("1.2.3".to_string()),
            root_dir: PathBuf::from("/repo/packages/a"),
            dependencies: Vec::new(),
        };
        assert_eq!(package.to_string(), "pkg-a@1.2.3");
    }
}
