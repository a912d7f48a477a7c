//! The single pass from workspace discovery to running pnpm.

use std::collections::HashSet;
use std::env;
use std::io::{stderr, stdin, stdout, IsTerminal};
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{debug, info, warn};
use pnpm_pick_core::command::build_arguments;
use pnpm_pick_core::config::Settings;
use pnpm_pick_core::error::{Error, Result};
use pnpm_pick_core::execution::Launcher;
use pnpm_pick_core::filter::{PackageFilter, SelectorFilter};
use pnpm_pick_core::history::{now_millis, HistoryStore};
use pnpm_pick_core::manifest::{read_workspace_manifest, GroupMap};
use pnpm_pick_core::packages::{PackageDescriptor, PackageSource, WorkspacePackageSource};
use pnpm_pick_core::selection::{
    build_choices, describe, flatten_selection, ChoiceItem, ResolvedGroup, Selection,
};
use pnpm_pick_core::workspace::find_workspace_dir;

use crate::checklist::{Checklist, ChecklistOutcome};
use crate::cli_args::Args;

/// Everything about the invocation that does not come from the arguments.
#[derive(Debug, Clone)]
pub struct Context {
    pub current_dir: PathBuf,
    pub settings: Settings,
    /// Whether stdin, stdout and stderr are all terminals
    pub interactive: bool,
}

impl Context {
    /// Captures the working directory, settings and terminal state of this process.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be read.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            current_dir: env::current_dir()?,
            settings: Settings::from_env(),
            interactive: is_interactive(),
        })
    }
}

/// True when a prompt can be shown; CI and pipes fall back to the whole workspace.
#[must_use]
pub fn is_interactive() -> bool {
    stdin().is_terminal() && stdout().is_terminal() && stderr().is_terminal()
}

/// Runs pnpm-pick once, returning the exit code of pnpm.
///
/// # Errors
///
/// Returns an error for configuration problems, a corrupt history file, a
/// cancelled prompt, or when pnpm cannot be started. The child's own failure
/// is not an error; its exit code is returned.
pub fn run(
    args: &Args,
    context: &Context,
    checklist: &mut dyn Checklist,
    launcher: &dyn Launcher,
) -> Result<i32> {
    let settings = &context.settings;
    let root = find_workspace_dir(
        &context.current_dir,
        settings.workspace_dir_override.as_deref(),
    )?;
    let manifest = read_workspace_manifest(&root)?;
    let groups = manifest.groups_or_empty();
    let history = HistoryStore::load(&settings.history_path)?;

    let selection = if context.interactive {
        let source = WorkspacePackageSource::for_manifest(&manifest)?;
        let packages = source.list_packages(&root)?;

        select_interactively(&root, &groups, &packages, history, settings, checklist)?
    } else {
        info!("Not running in a terminal, selecting the whole workspace");
        Selection::Workspace
    };

    debug!("Selected {}", describe(&selection));

    let arguments = build_arguments(&selection, &args.pass_through);
    launcher.launch(&settings.package_manager, &arguments)
}

fn select_interactively(
    root: &Path,
    groups: &GroupMap,
    packages: &[PackageDescriptor],
    mut history: HistoryStore,
    settings: &Settings,
    checklist: &mut dyn Checklist,
) -> Result<Selection> {
    let root_key = root.to_string_lossy().into_owned();
    let known_packages: HashSet<String> = packages.iter().map(|p| p.name.clone()).collect();

    let resolved_groups = resolve_groups(root, groups, packages)?;
    let history_entries = history.entries_for(&root_key, &known_packages);
    let now = now_millis();

    let items = build_choices(&resolved_groups, &history_entries, packages, root, now);
    if items.is_empty() {
        return Err(Error::NothingToSelect {
            root: root.to_path_buf(),
        });
    }

    let selected = match checklist.present(&items)? {
        ChecklistOutcome::Selected(indexes) => indexes,
        ChecklistOutcome::Cancelled => return Err(Error::Cancelled),
    };

    let chosen_packages = flatten_selection(
        selected
            .iter()
            .filter_map(|&index| items.get(index).and_then(ChoiceItem::as_choice))
            .map(|choice| choice.value.as_slice()),
    );

    history.record_selection(&root_key, chosen_packages.clone(), &known_packages, now);
    history.save(&settings.history_path)?;

    Ok(Selection::Packages(chosen_packages))
}

/// Resolves each group's filters to package names, leaving out groups that
/// match nothing.
fn resolve_groups(
    root: &Path,
    groups: &GroupMap,
    packages: &[PackageDescriptor],
) -> Result<Vec<ResolvedGroup>> {
    let filter = SelectorFilter::new(root);
    let mut resolved = Vec::with_capacity(groups.len());

    for (name, filters) in groups {
        let group_packages = filter.select(packages, filters)?;
        if group_packages.is_empty() {
            warn!("Group `{name}` does not match any workspace package");
            continue;
        }

        resolved.push(ResolvedGroup {
            name: name.clone(),
            packages: group_packages,
        });
    }

    debug!(
        "Resolved groups: {}",
        resolved.iter().map(|group| group.name.as_str()).join(", ")
    );
    Ok(resolved)
}
