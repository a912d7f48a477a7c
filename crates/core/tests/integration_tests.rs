//! Integration tests for pnpm-pick-core
//!
//! These tests drive a real workspace on disk through discovery, group
//! resolution, history and argument building.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use pnpm_pick_core::{
    command::build_arguments,
    error::Error,
    filter::{PackageFilter, SelectorFilter},
    history::HistoryStore,
    manifest::read_workspace_manifest,
    packages::{PackageSource, WorkspacePackageSource},
    selection::{build_choices, flatten_selection, ChoiceItem, ChoiceKind, ResolvedGroup, Selection},
    workspace::find_workspace_dir,
};
use tempfile::TempDir;

fn write_package(root: &Path, dir: &str, json: &str) {
    let package_dir = root.join(dir);
    fs::create_dir_all(&package_dir).unwrap();
    fs::write(package_dir.join("package.json"), json).unwrap();
}

/// A small monorepo: two apps, a shared library and an ignored fixture.
fn monorepo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    fs::write(
        root.join("pnpm-workspace.yaml"),
        r#"
packages:
  - "apps/*"
  - "libs/**"
  - "!**/fixtures/**"
groups:
  frontend:
    - "@acme/web..."
  everything-but-docs:
    - "!docs"
  empty: []
"#,
    )
    .unwrap();

    write_package(root, ".", r#"{ "name": "monorepo", "private": true }"#);
    write_package(
        root,
        "apps/web",
        r#"{ "name": "@acme/web", "version": "2.1.0", "dependencies": { "@acme/ui": "workspace:*", "react": "^18" } }"#,
    );
    write_package(root, "apps/docs", r#"{ "name": "docs" }"#);
    write_package(
        root,
        "libs/ui",
        r#"{ "name": "@acme/ui", "version": "0.3.0", "devDependencies": { "@acme/tokens": "workspace:^" } }"#,
    );
    write_package(root, "libs/design/tokens", r#"{ "name": "@acme/tokens" }"#);
    write_package(root, "libs/ui/fixtures/broken", r#"{ "name": "fixture" }"#);
    write_package(root, "apps/web/node_modules/react", r#"{ "name": "react" }"#);

    dir
}

#[test]
fn test_discovery_follows_manifest_globs() {
    let dir = monorepo();
    let root = find_workspace_dir(&dir.path().join("apps/web/src"), None).unwrap();
    assert_eq!(root, dir.path());

    let manifest = read_workspace_manifest(&root).unwrap();
    let source = WorkspacePackageSource::for_manifest(&manifest).unwrap();
    let names: Vec<String> = source
        .list_packages(&root)
        .unwrap()
        .into_iter()
        .map(|package| package.name)
        .collect();

    assert_eq!(
        names,
        vec!["@acme/tokens", "@acme/ui", "@acme/web", "docs", "monorepo"]
    );
}

#[test]
fn test_groups_resolve_through_the_dependency_graph() {
    let dir = monorepo();
    let root = dir.path();
    let manifest = read_workspace_manifest(root).unwrap();
    let packages = WorkspacePackageSource::for_manifest(&manifest)
        .unwrap()
        .list_packages(root)
        .unwrap();
    let groups = manifest.required_groups().unwrap();
    let filter = SelectorFilter::new(root);

    assert_eq!(
        filter.select(&packages, &groups["frontend"]).unwrap(),
        vec!["@acme/tokens", "@acme/ui", "@acme/web"]
    );
    assert_eq!(
        filter.select(&packages, &groups["everything-but-docs"]).unwrap(),
        vec!["@acme/tokens", "@acme/ui", "@acme/web", "monorepo"]
    );
    assert!(filter.select(&packages, &groups["empty"]).unwrap().is_empty());
}

#[test]
fn test_selection_round_trip_through_history() {
    let dir = monorepo();
    let root = dir.path();
    let root_key = root.to_string_lossy().into_owned();
    let history_path = root.join(".pnpm-pick").join("history.json");

    let manifest = read_workspace_manifest(root).unwrap();
    let packages = WorkspacePackageSource::for_manifest(&manifest)
        .unwrap()
        .list_packages(root)
        .unwrap();
    let known: HashSet<String> = packages.iter().map(|p| p.name.clone()).collect();
    let groups = vec![ResolvedGroup {
        name: "frontend".to_string(),
        packages: vec!["@acme/ui".to_string(), "@acme/web".to_string()],
    }];

    let mut history = HistoryStore::load(&history_path).unwrap();
    let items = build_choices(&groups, &history.entries_for(&root_key, &known), &packages, root, 0);
    assert_eq!(items.len(), 1 + 1 + packages.len());

    // Pick the group and a package it already contains, then `docs`
    let picked: Vec<&[String]> = items
        .iter()
        .filter_map(ChoiceItem::as_choice)
        .filter(|choice| {
            choice.kind == ChoiceKind::Group || choice.label == "@acme/web" || choice.label == "docs"
        })
        .map(|choice| choice.value.as_slice())
        .collect();
    let chosen = flatten_selection(picked);
    assert_eq!(chosen, vec!["@acme/ui", "@acme/web", "docs"]);

    history.record_selection(&root_key, chosen.clone(), &known, 1_000);
    history.save(&history_path).unwrap();

    let reloaded = HistoryStore::load(&history_path).unwrap();
    let items = build_choices(&groups, &reloaded.entries_for(&root_key, &known), &packages, root, 61_000);
    let history_choice = items
        .iter()
        .filter_map(ChoiceItem::as_choice)
        .find(|choice| choice.kind == ChoiceKind::History)
        .unwrap();
    assert_eq!(history_choice.label, "@acme/ui, @acme/web, docs");
    assert_eq!(history_choice.description.as_deref(), Some("1 minute ago"));

    assert_eq!(
        build_arguments(&Selection::Packages(chosen), &["run".to_string(), "lint".to_string()]),
        vec!["-F=@acme/ui", "-F=@acme/web", "-F=docs", "run", "lint"]
    );
}

#[test]
fn test_corrupt_history_is_deleted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.json");
    fs::write(&path, r#"{ "/repo": [{ "timestamp": "yesterday" }] }"#).unwrap();

    let result = HistoryStore::load(&path);

    assert!(matches!(result, Err(Error::CorruptHistory { .. })));
    assert!(!path.exists());
    assert!(HistoryStore::load(&path).unwrap().raw_entries("/repo").is_empty());
}

#[test]
fn test_manifest_problems_are_reported() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    fs::write(root.join("pnpm-workspace.yaml"), "groups:\n  core: pkg-a\n").unwrap();
    assert!(matches!(
        read_workspace_manifest(root),
        Err(Error::InvalidGroupEntry { group }) if group == "core"
    ));

    fs::write(root.join("pnpm-workspace.yaml"), "groups:\n  - pkg-a\n").unwrap();
    assert!(matches!(read_workspace_manifest(root), Err(Error::InvalidGroupsType)));

    fs::write(root.join("pnpm-workspace.yaml"), "packages: []\n").unwrap();
    let manifest = read_workspace_manifest(root).unwrap();
    assert!(manifest.groups_or_empty().is_empty());
    assert!(matches!(manifest.required_groups(), Err(Error::MissingGroupsConfig)));
}
