//! Building the package manager argument vector.

use crate::selection::Selection;

/// Command run when no arguments are passed through.
pub const DEFAULT_COMMAND: &str = "install";

/// Flag scoping the package manager to every workspace package.
pub const RECURSIVE_FLAG: &str = "-r";

/// Returns the filter flag for one package, e.g. `-F=pkg-a`.
#[must_use]
pub fn filter_flag(package: &str) -> String {
    format!("-F={package}")
}

/// Builds the arguments: the scope flags, then the pass-through arguments or
/// [`DEFAULT_COMMAND`] when there are none.
///
/// # Examples
///
/// ```
/// use pnpm_pick_core::command::build_arguments;
/// use pnpm_pick_core::selection::Selection;
///
/// let selection = Selection::Packages(vec!["pkg-c".to_string()]);
/// let pass_through = vec!["test".to_string(), "--watch".to_string()];
///
/// assert_eq!(build_arguments(&selection, &pass_through), ["-F=pkg-c", "test", "--watch"]);
/// ```
#[must_use]
pub fn build_arguments(selection: &Selection, pass_through: &[String]) -> Vec<String> {
    let mut arguments: Vec<String> = match selection {
        Selection::Packages(packages) => packages.iter().map(|p| filter_flag(p)).collect(),
        Selection::Workspace => vec![RECURSIVE_FLAG.to_string()],
    };

    if pass_through.is_empty() {
        arguments.push(DEFAULT_COMMAND.to_string());
    } else {
        arguments.extend(pass_through.iter().cloned());
    }

    arguments
}
