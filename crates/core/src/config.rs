//! Configuration path utilities for pnpm-pick.
//!
//! The tool interprets no command-line flags of its own, so every setting is
//! either a default or an environment override. Shell expansions like `~` are
//! resolved in paths.

use std::env;
use std::path::PathBuf;

/// Default path for the selection history file
const DEFAULT_HISTORY_PATH: &str = "~/.pnpm-pick/history.json";

/// Environment variable overriding the history file path
pub const HISTORY_PATH_VAR: &str = "PNPM_PICK_HISTORY_PATH";
/// Environment variable overriding the package manager executable
pub const PACKAGE_MANAGER_VAR: &str = "PNPM_PICK_PACKAGE_MANAGER";
/// Environment variables pnpm reads to force the workspace directory
pub const WORKSPACE_DIR_VARS: [&str; 2] = ["NPM_CONFIG_WORKSPACE_DIR", "npm_config_workspace_dir"];

/// Name of the workspace manifest, which also marks the workspace root
pub const WORKSPACE_MANIFEST_FILENAME: &str = "pnpm-workspace.yaml";

/// Default package manager executable
#[cfg(windows)]
pub const DEFAULT_PACKAGE_MANAGER: &str = "pnpm.cmd";
#[cfg(not(windows))]
pub const DEFAULT_PACKAGE_MANAGER: &str = "pnpm";

/// Settings resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub history_path: PathBuf,
    pub package_manager: String,
    pub workspace_dir_override: Option<PathBuf>,
}

impl Settings {
    /// Resolves all settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            history_path: get_history_path(&non_empty_var(HISTORY_PATH_VAR)),
            package_manager: get_package_manager(&non_empty_var(PACKAGE_MANAGER_VAR)),
            workspace_dir_override: get_workspace_dir_override(
                &WORKSPACE_DIR_VARS.iter().find_map(|name| non_empty_var(name)),
            ),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Resolves the history file path.
///
/// If a custom path is provided, uses that path. Otherwise, uses the default
/// history path. Shell expansions like `~` are resolved.
///
/// # Examples
///
/// ```
/// use pnpm_pick_core::config::get_history_path;
///
/// let custom = get_history_path(&Some("/tmp/history.json".to_string()));
/// assert_eq!(custom, std::path::PathBuf::from("/tmp/history.json"));
/// ```
pub fn get_history_path(history_path_arg: &Option<String>) -> PathBuf {
    let history_path = match history_path_arg {
        Some(history_path) => history_path,
        None => DEFAULT_HISTORY_PATH,
    };

    PathBuf::from(shellexpand::tilde(history_path).to_string())
}

/// Resolves the package manager executable, falling back to pnpm.
pub fn get_package_manager(package_manager_arg: &Option<String>) -> String {
    package_manager_arg
        .clone()
        .unwrap_or_else(|| DEFAULT_PACKAGE_MANAGER.to_string())
}

/// Expands a forced workspace directory, if one is set.
pub fn get_workspace_dir_override(workspace_dir: &Option<String>) -> Option<PathBuf> {
    workspace_dir
        .as_ref()
        .map(|dir| PathBuf::from(shellexpand::tilde(dir).to_string()))
}
