//! Choices offered to the user and the selection made from them.

use std::fmt::{Display, Formatter};
use std::path::Path;

use indexmap::IndexSet;
use itertools::Itertools;

use crate::history::HistoryEntry;
use crate::packages::PackageDescriptor;

/// Where a choice came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceKind {
    Group,
    History,
    Package,
}

/// One selectable line of the checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub kind: ChoiceKind,
    pub label: String,
    pub description: Option<String>,
    /// Package names this choice stands for.
    pub value: Vec<String>,
}

impl Display for Choice {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.label)
    }
}

/// An entry of the checklist: a choice or a blank section separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceItem {
    Separator,
    Choice(Choice),
}

impl ChoiceItem {
    #[must_use]
    pub fn as_choice(&self) -> Option<&Choice> {
        match self {
            Self::Choice(choice) => Some(choice),
            Self::Separator => None,
        }
    }
}

/// A group whose filters have been resolved to package names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGroup {
    pub name: String,
    pub packages: Vec<String>,
}

/// What the package manager will be scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Explicit package names, in selection order.
    Packages(Vec<String>),
    /// Every package of the workspace.
    Workspace,
}

/// Builds the checklist: groups, then history, then individual packages.
///
/// A separator precedes a section only when something comes before it and
/// the section itself has choices.
#[must_use]
pub fn build_choices(
    groups: &[ResolvedGroup],
    history: &[HistoryEntry],
    packages: &[PackageDescriptor],
    workspace_root: &Path,
    now: i64,
) -> Vec<ChoiceItem> {
    let group_choices = groups.iter().map(|group| Choice {
        kind: ChoiceKind::Group,
        label: group.name.clone(),
        description: Some(group.packages.join(", ")),
        value: group.packages.clone(),
    });

    let history_choices = history.iter().map(|entry| Choice {
        kind: ChoiceKind::History,
        label: entry.packages.join(", "),
        description: Some(entry.age_description(now)),
        value: entry.packages.clone(),
    });

    let package_choices = packages.iter().map(|package| {
        let location = package.relative_dir(workspace_root).display().to_string();
        Choice {
            kind: ChoiceKind::Package,
            label: package.name.clone(),
            description: Some(match &package.version {
                Some(version) => format!("{version} ({location})"),
                None => location,
            }),
            value: vec![package.name.clone()],
        }
    });

    let mut items: Vec<ChoiceItem> = Vec::new();

    push_section(&mut items, group_choices.collect());
    push_section(&mut items, history_choices.collect());
    push_section(&mut items, package_choices.collect());

    items
}

fn push_section(items: &mut Vec<ChoiceItem>, section: Vec<Choice>) {
    if section.is_empty() {
        return;
    }

    if !items.is_empty() {
        items.push(ChoiceItem::Separator);
    }

    items.extend(section.into_iter().map(ChoiceItem::Choice));
}

/// Flattens the values of the chosen items, keeping the first occurrence of each name.
#[must_use]
pub fn flatten_selection<'a>(values: impl IntoIterator<Item = &'a [String]>) -> Vec<String> {
    values
        .into_iter()
        .flatten()
        .cloned()
        .collect::<IndexSet<String>>()
        .into_iter()
        .collect()
}

/// Short summary of a selection for log lines.
#[must_use]
pub fn describe(selection: &Selection) -> String {
    match selection {
        Selection::Workspace => "the whole workspace".to_string(),
        Selection::Packages(packages) => packages.iter().join(", "),
    }
}
