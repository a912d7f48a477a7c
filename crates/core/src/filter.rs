//! Resolving group filter expressions into concrete package names.
//!
//! [`SelectorFilter`] understands the common subset of pnpm's `--filter`
//! selectors:
//!
//! - `pkg-a`, `@scope/*`: package names, `*` matching any run of characters
//! - `./packages/a`, `{packages/*}`: packages located at or below a directory
//! - `pkg-a...`, `...pkg-a`: the package plus its dependencies or dependents
//! - `pkg-a^...`, `...^pkg-a`: the same, without the package itself
//! - `!selector`: removes the selector's matches from the result

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobBuilder, GlobMatcher};
use indexmap::IndexSet;
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::packages::PackageDescriptor;

/// Resolves filter expressions against a package list.
pub trait PackageFilter {
    /// Returns the names of the packages matched by `filters`, in filter order.
    ///
    /// # Errors
    ///
    /// Returns an error if a filter cannot be parsed.
    fn select(&self, packages: &[PackageDescriptor], filters: &[String]) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Name(String),
    Directory(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Selector {
    exclude: bool,
    target: Target,
    with_dependencies: bool,
    with_dependents: bool,
    exclude_self: bool,
}

fn parse_selector(raw: &str) -> Option<Selector> {
    let mut rest = raw.trim();

    let exclude = match rest.strip_prefix('!') {
        Some(stripped) => {
            rest = stripped;
            true
        }
        None => false,
    };

    let mut exclude_self = false;

    let with_dependents = match rest.strip_prefix("...") {
        Some(stripped) => {
            rest = stripped;
            if let Some(stripped) = rest.strip_prefix('^') {
                rest = stripped;
                exclude_self = true;
            }
            true
        }
        None => false,
    };

    let with_dependencies = match rest.strip_suffix("...") {
        Some(stripped) => {
            rest = stripped;
            if let Some(stripped) = rest.strip_suffix('^') {
                rest = stripped;
                exclude_self = true;
            }
            true
        }
        None => false,
    };

    let target = if let Some(directory) = rest.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
        Target::Directory(directory.to_string())
    } else if rest.starts_with('.') {
        Target::Directory(rest.to_string())
    } else if rest.is_empty() {
        return None;
    } else {
        Target::Name(rest.to_string())
    };

    Some(Selector {
        exclude,
        target,
        with_dependencies,
        with_dependents,
        exclude_self,
    })
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

fn compile(pattern: &str, literal_separator: bool) -> Result<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(literal_separator)
        .build()
        .map(|glob: Glob| glob.compile_matcher())
        .map_err(|e| Error::Glob(pattern.to_string(), e))
}

/// Lexically resolves `.` and `..` without touching the filesystem.
fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }

    cleaned
}

fn slash_path(path: &Path) -> String {
    if path == Path::new(".") {
        return ".".to_string();
    }

    path.components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Dependency edges between workspace packages, by index.
struct Graph {
    dependencies: Vec<Vec<usize>>,
    dependents: Vec<Vec<usize>>,
}

impl Graph {
    fn new(packages: &[PackageDescriptor]) -> Self {
        let index_by_name: HashMap<&str, usize> = packages
            .iter()
            .enumerate()
            .map(|(i, package)| (package.name.as_str(), i))
            .collect();

        let mut dependencies = vec![Vec::new(); packages.len()];
        let mut dependents = vec![Vec::new(); packages.len()];

        for (i, package) in packages.iter().enumerate() {
            for dependency in &package.dependencies {
                if let Some(&j) = index_by_name.get(dependency.as_str()) {
                    if i != j {
                        dependencies[i].push(j);
                        dependents[j].push(i);
                    }
                }
            }
        }

        Self {
            dependencies,
            dependents,
        }
    }

    fn reachable(edges: &[Vec<usize>], seeds: &[usize]) -> HashSet<usize> {
        let mut seen: HashSet<usize> = HashSet::new();
        let mut queue: VecDeque<usize> = seeds.iter().copied().collect();

        while let Some(current) = queue.pop_front() {
            for &next in &edges[current] {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        seen
    }
}

/// The default [`PackageFilter`], resolving directories against a workspace root.
#[derive(Debug, Clone)]
pub struct SelectorFilter {
    workspace_root: PathBuf,
}

impl SelectorFilter {
    #[must_use]
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
        }
    }

    fn match_names(&self, packages: &[PackageDescriptor], pattern: &str) -> Result<Vec<usize>> {
        let matched = match_name_pattern(packages, pattern)?;
        if !matched.is_empty() || pattern.starts_with('@') {
            return Ok(matched);
        }

        // Unscoped names also match a single scoped package, as pnpm does
        let scoped = match_name_pattern(packages, &format!("@*/{pattern}"))?;
        if scoped.len() == 1 {
            debug!("Filter `{pattern}` matched scoped package `{}`", packages[scoped[0]].name);
            return Ok(scoped);
        }

        Ok(Vec::new())
    }

    fn match_directory(&self, packages: &[PackageDescriptor], directory: &str) -> Result<Vec<usize>> {
        if is_glob(directory) {
            let trimmed = directory.strip_prefix("./").unwrap_or(directory);
            let matcher = compile(trimmed.trim_end_matches('/'), true)?;
            return Ok(packages
                .iter()
                .enumerate()
                .filter(|(_, package)| {
                    matcher.is_match(slash_path(&package.relative_dir(&self.workspace_root)))
                })
                .map(|(i, _)| i)
                .collect());
        }

        let target = clean_path(&self.workspace_root.join(directory));
        Ok(packages
            .iter()
            .enumerate()
            .filter(|(_, package)| clean_path(&package.root_dir).starts_with(&target))
            .map(|(i, _)| i)
            .collect())
    }

    fn resolve(
        &self,
        packages: &[PackageDescriptor],
        graph: &Graph,
        selector: &Selector,
    ) -> Result<Vec<usize>> {
        let seeds = match &selector.target {
            Target::Name(pattern) => self.match_names(packages, pattern)?,
            Target::Directory(directory) => self.match_directory(packages, directory)?,
        };

        let mut matched: HashSet<usize> = if selector.exclude_self {
            HashSet::new()
        } else {
            seeds.iter().copied().collect()
        };

        if selector.with_dependencies {
            matched.extend(Graph::reachable(&graph.dependencies, &seeds));
        }

        if selector.with_dependents {
            matched.extend(Graph::reachable(&graph.dependents, &seeds));
        }

        let mut matched: Vec<usize> = matched.into_iter().collect();
        matched.sort_unstable();
        Ok(matched)
    }
}

fn match_name_pattern(packages: &[PackageDescriptor], pattern: &str) -> Result<Vec<usize>> {
    if !is_glob(pattern) {
        return Ok(packages
            .iter()
            .position(|package| package.name == pattern)
            .into_iter()
            .collect());
    }

    let matcher = compile(pattern, false)?;
    Ok(packages
        .iter()
        .enumerate()
        .filter(|(_, package)| matcher.is_match(&package.name))
        .map(|(i, _)| i)
        .collect())
}

impl PackageFilter for SelectorFilter {
    fn select(&self, packages: &[PackageDescriptor], filters: &[String]) -> Result<Vec<String>> {
        let graph = Graph::new(packages);
        let mut included: IndexSet<usize> = IndexSet::new();
        let mut excluded: HashSet<usize> = HashSet::new();
        let mut has_includes = false;
        let mut has_excludes = false;

        for raw in filters {
            let Some(selector) = parse_selector(raw) else {
                warn!("Ignoring empty filter `{raw}`");
                continue;
            };

            let matched = self.resolve(packages, &graph, &selector)?;
            if matched.is_empty() {
                warn!("Filter `{raw}` did not match any workspace package");
            }

            if selector.exclude {
                has_excludes = true;
                excluded.extend(matched);
            } else {
                has_includes = true;
                included.extend(matched);
            }
        }

        if !has_includes && has_excludes {
            included.extend(0..packages.len());
        }

        Ok(included
            .into_iter()
            .filter(|i| !excluded.contains(i))
            .map(|i| packages[i].name.clone())
            .collect())
    }
}
