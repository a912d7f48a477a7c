//! Reading and validating `pnpm-workspace.yaml`.
//!
//! The manifest is loaded as an untyped YAML document and then validated in
//! an explicit pass, so a malformed `groups` or `packages` field produces a
//! specific error rather than a generic deserialization failure.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde_yaml::Value;

use crate::config::WORKSPACE_MANIFEST_FILENAME;
use crate::error::{Error, Result};

/// Group name to ordered list of filter expressions.
pub type GroupMap = IndexMap<String, Vec<String>>;

/// The parts of `pnpm-workspace.yaml` this tool cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceManifest {
    /// Globs locating workspace packages; `!` excludes. `None` when the
    /// manifest has no `packages` key.
    pub packages: Option<Vec<String>>,
    /// `None` when the manifest has no `groups` key.
    pub groups: Option<GroupMap>,
}

impl WorkspaceManifest {
    /// Groups for a caller that does not insist on them being configured.
    #[must_use]
    pub fn groups_or_empty(&self) -> GroupMap {
        self.groups.clone().unwrap_or_default()
    }

    /// Groups for a caller that cannot work without them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingGroupsConfig`] when the manifest had no `groups`.
    pub fn required_groups(&self) -> Result<&GroupMap> {
        self.groups.as_ref().ok_or(Error::MissingGroupsConfig)
    }
}

/// Reads the manifest found in the workspace root.
///
/// # Errors
///
/// Returns an error if:
/// - The manifest cannot be read
/// - The YAML is malformed
/// - `packages` is not a list of strings
/// - `groups` is not a mapping of names to lists of strings
pub fn read_workspace_manifest(root: &Path) -> Result<WorkspaceManifest> {
    let path = root.join(WORKSPACE_MANIFEST_FILENAME);
    let content = fs::read_to_string(&path)
        .map_err(|e| Error::io_error("workspace manifest", &path, e))?;

    parse_manifest_content(&content, &path)
}

/// Parses manifest content.
///
/// An empty document is a valid manifest with no packages and no groups.
///
/// # Errors
///
/// See [`read_workspace_manifest`].
pub fn parse_workspace_manifest(content: &str) -> Result<WorkspaceManifest> {
    parse_manifest_content(content, Path::new(WORKSPACE_MANIFEST_FILENAME))
}

fn parse_manifest_content(content: &str, path: &Path) -> Result<WorkspaceManifest> {
    if content.trim().is_empty() {
        return Ok(WorkspaceManifest::default());
    }

    let document: Value = serde_yaml::from_str(content)
        .map_err(|e| Error::yaml_error("reading", "workspace manifest", path, e))?;

    let document = match document {
        Value::Null => return Ok(WorkspaceManifest::default()),
        Value::Mapping(mapping) => mapping,
        _ => return Err(Error::InvalidWorkspaceManifest(path.to_path_buf())),
    };

    let packages = match document.get("packages") {
        None | Some(Value::Null) => None,
        Some(value) => Some(string_list(value).ok_or(Error::InvalidPackagesField)?),
    };

    let groups = match document.get("groups") {
        None | Some(Value::Null) => None,
        Some(value) => Some(validate_groups(value)?),
    };

    Ok(WorkspaceManifest { packages, groups })
}

/// Validates the shape of a `groups` value.
///
/// # Errors
///
/// Returns [`Error::InvalidGroupsType`] if the value is not a mapping with
/// string keys, and [`Error::InvalidGroupEntry`] naming the first group whose
/// value is not a list of strings.
pub fn validate_groups(value: &Value) -> Result<GroupMap> {
    let Value::Mapping(mapping) = value else {
        return Err(Error::InvalidGroupsType);
    };

    let mut groups = GroupMap::with_capacity(mapping.len());

    for (key, filters) in mapping {
        let name = group_name(key).ok_or(Error::InvalidGroupsType)?;
        let filters = string_list(filters).ok_or_else(|| Error::InvalidGroupEntry {
            group: name.clone(),
        })?;

        groups.insert(name, filters);
    }

    Ok(groups)
}

fn group_name(key: &Value) -> Option<String> {
    match key {
        Value::String(name) => Some(name.clone()),
        // YAML happily parses `2024:` as a number; the user still meant a name
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    let Value::Sequence(items) = value else {
        return None;
    };

    items
        .iter()
        .map(|item| item.as_str().map(ToString::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(content: &str) -> Value {
        serde_yaml::from_str(content).unwrap()
    }

    #[test]
    fn test_validate_groups_valid() {
        let groups = validate_groups(&yaml(
            r#"
core: ["pkg-a", "pkg-b"]
web:
  - "@app/*"
empty: []
"#,
        ))
        .unwrap();

        assert_eq!(groups.len(), 3);
        assert_eq!(groups["core"], vec!["pkg-a", "pkg-b"]);
        assert_eq!(groups["web"], vec!["@app/*"]);
        assert!(groups["empty"].is_empty());

        // Declaration order is kept for display
        let names: Vec<&String> = groups.keys().collect();
        assert_eq!(names, ["core", "web", "empty"]);
    }

    #[test]
    fn test_validate_groups_not_a_mapping() {
        let result = validate_groups(&yaml(r#"["pkg-a"]"#));
        assert!(matches!(result, Err(Error::InvalidGroupsType)));

        let result = validate_groups(&yaml("just a string"));
        assert!(matches!(result, Err(Error::InvalidGroupsType)));
    }

    #[test]
    fn test_validate_groups_value_not_a_list() {
        let result = validate_groups(&yaml("core: pkg-a"));
        assert!(matches!(result, Err(Error::InvalidGroupEntry { group }) if group == "core"));
    }

    #[test]
    fn test_validate_groups_non_string_element() {
        let result = validate_groups(&yaml(
            r#"
ok: ["pkg-a"]
broken: ["pkg-b", 3]
"#,
        ));
        assert!(matches!(result, Err(Error::InvalidGroupEntry { group }) if group == "broken"));

        let result = validate_groups(&yaml("nested: [[\"pkg-a\"]]"));
        assert!(matches!(result, Err(Error::InvalidGroupEntry { .. })));
    }

    #[test]
    fn test_parse_manifest_without_groups() {
        let manifest = parse_workspace_manifest("packages:\n  - packages/*\n").unwrap();
        assert_eq!(manifest.packages, Some(vec!["packages/*".to_string()]));
        assert!(manifest.groups.is_none());
        assert!(manifest.groups_or_empty().is_empty());
        assert!(matches!(
            manifest.required_groups(),
            Err(Error::MissingGroupsConfig)
        ));
    }

    #[test]
    fn test_parse_manifest_without_packages() {
        let manifest = parse_workspace_manifest("groups:\n  core:\n    - pkg-a\n").unwrap();
        assert!(manifest.packages.is_none());
        assert_eq!(manifest.groups_or_empty()["core"], vec!["pkg-a"]);
    }

    #[test]
    fn test_parse_manifest_with_null_groups() {
        let manifest = parse_workspace_manifest("packages: []\ngroups:\n").unwrap();
        assert!(manifest.groups.is_none());
    }

    #[test]
    fn test_parse_empty_manifest() {
        let manifest = parse_workspace_manifest("").unwrap();
        assert_eq!(manifest, WorkspaceManifest::default());

        let manifest = parse_workspace_manifest("  \n").unwrap();
        assert_eq!(manifest, WorkspaceManifest::default());
    }

    #[test]
    fn test_parse_manifest_invalid_packages() {
        let result = parse_workspace_manifest("packages: packages/*\n");
        assert!(matches!(result, Err(Error::InvalidPackagesField)));
    }

    #[test]
    fn test_parse_manifest_invalid_groups() {
        let result = parse_workspace_manifest("groups: 12\n");
        assert!(matches!(result, Err(Error::InvalidGroupsType)));
    }

    #[test]
    fn test_parse_manifest_not_a_mapping() {
        let result = parse_workspace_manifest("- packages/*\n");
        assert!(matches!(result, Err(Error::InvalidWorkspaceManifest(_))));
    }

    #[test]
    fn test_parse_manifest_invalid_yaml() {
        let result = parse_workspace_manifest("packages: [\n");
        assert!(matches!(result, Err(Error::Yaml { .. })));
    }

    #[test]
    fn test_numeric_group_name() {
        let groups = validate_groups(&yaml("2024: [\"pkg-a\"]")).unwrap();
        assert_eq!(groups["2024"], vec!["pkg-a"]);
    }
}
