//! Persisted selection history.
//!
//! The history file is a JSON object mapping absolute workspace roots to the
//! most recent distinct selections made there:
//!
//! ```json
//! {
//!   "/home/me/repo": [
//!     { "timestamp": 1718000000000, "packages": ["pkg-a", "pkg-b"] }
//!   ]
//! }
//! ```
//!
//! The file is read once at startup and rewritten in full at the end of a
//! run. Concurrent runs are not coordinated; the last writer wins.

use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Maximum number of selections remembered per workspace.
pub const MAX_ENTRIES_PER_WORKSPACE: usize = 10;

const FILE_DESCRIPTION: &str = "history";

/// A previously made selection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub packages: Vec<String>,
}

impl HistoryEntry {
    /// Human readable age relative to `now`, e.g. `5 minutes ago`.
    #[must_use]
    pub fn age_description(&self, now: i64) -> String {
        let seconds = now.saturating_sub(self.timestamp).max(0) / 1000;

        let (amount, unit) = match seconds {
            0..=59 => return "just now".to_string(),
            60..=3_599 => (seconds / 60, "minute"),
            3_600..=86_399 => (seconds / 3_600, "hour"),
            _ => (seconds / 86_400, "day"),
        };

        let plural = if amount == 1 { "" } else { "s" };
        format!("{amount} {unit}{plural} ago")
    }
}

/// Current time in epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

/// All remembered selections, keyed by workspace root.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct HistoryStore {
    workspaces: IndexMap<String, Vec<HistoryEntry>>,
}

impl HistoryStore {
    /// Loads the history file.
    ///
    /// A missing file is an empty history. Workspace keys whose value is not
    /// a list are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptHistory`] after deleting the file if it is not
    /// valid JSON or its entries have the wrong shape, so the next run starts
    /// clean. Returns an IO error if the file exists but cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No history file at `{}`", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(Error::io_error(FILE_DESCRIPTION, path, e)),
        };

        Self::parse(&content).map_err(|reason| discard_corrupt_file(path, reason))
    }

    fn parse(content: &str) -> std::result::Result<Self, String> {
        let document: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;

        let Value::Object(document) = document else {
            return Err("expected a JSON object".to_string());
        };

        let mut workspaces = IndexMap::with_capacity(document.len());

        for (root, value) in document {
            let Value::Array(items) = value else {
                debug!("Dropping history for `{root}`: not a list");
                continue;
            };

            let entries = items
                .into_iter()
                .map(serde_json::from_value::<HistoryEntry>)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| format!("invalid entry for `{root}`: {e}"))?;

            workspaces.insert(root, entries);
        }

        Ok(Self { workspaces })
    }

    /// Writes the whole history, replacing the file atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or temporary file cannot be created,
    /// or the file cannot be replaced.
    pub fn save(&self, path: &Path) -> Result<()> {
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        fs::create_dir_all(directory)
            .map_err(|e| Error::io_error("history directory", directory, e))?;

        // Dropped without persisting on any error path, which removes it
        let mut temp_file = NamedTempFile::new_in(directory)
            .map_err(|e| Error::io_error(FILE_DESCRIPTION, directory, e))?;

        serde_json::to_writer_pretty(&mut temp_file, self)
            .map_err(|e| Error::json_error("writing", FILE_DESCRIPTION, path, e))?;
        temp_file
            .write_all(b"\n")
            .map_err(|e| Error::io_error(FILE_DESCRIPTION, path, e))?;

        temp_file
            .persist(path)
            .map_err(|e| Error::io_error(FILE_DESCRIPTION, path, e.error))?;

        debug!("History written to `{}`", path.display());
        Ok(())
    }

    /// Entries recorded for `root`, most recent first.
    ///
    /// Packages that no longer exist are left out, entries left empty are
    /// skipped, and entries made identical by that pruning are shown once.
    #[must_use]
    pub fn entries_for(&self, root: &str, known_packages: &HashSet<String>) -> Vec<HistoryEntry> {
        let mut entries: Vec<HistoryEntry> = self
            .workspaces
            .get(root)
            .map(|entries| entries.iter().map(|entry| prune(entry, known_packages)).collect())
            .unwrap_or_default();

        entries.retain(|entry| !entry.packages.is_empty());
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        dedup_by_packages(&mut entries);
        entries
    }

    /// Raw entries for `root`, as they will be written.
    #[must_use]
    pub fn raw_entries(&self, root: &str) -> &[HistoryEntry] {
        self.workspaces.get(root).map(Vec::as_slice).unwrap_or_default()
    }

    /// Records a new selection for `root`.
    ///
    /// Existing entries for the workspace lose packages missing from
    /// `known_packages`, the new selection is put first, and the list is
    /// capped at [`MAX_ENTRIES_PER_WORKSPACE`] and deduplicated by exact
    /// package list.
    pub fn record_selection(
        &mut self,
        root: &str,
        packages: Vec<String>,
        known_packages: &HashSet<String>,
        now: i64,
    ) {
        let entries = self.workspaces.entry(root.to_string()).or_default();

        for entry in entries.iter_mut() {
            entry.packages.retain(|package| known_packages.contains(package));
        }
        entries.retain(|entry| !entry.packages.is_empty());

        entries.insert(
            0,
            HistoryEntry {
                timestamp: now,
                packages,
            },
        );

        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(MAX_ENTRIES_PER_WORKSPACE);
        dedup_by_packages(entries);
    }
}

fn prune(entry: &HistoryEntry, known_packages: &HashSet<String>) -> HistoryEntry {
    HistoryEntry {
        timestamp: entry.timestamp,
        packages: entry
            .packages
            .iter()
            .filter(|package| known_packages.contains(*package))
            .cloned()
            .collect(),
    }
}

/// Keeps the first entry of each distinct package list; order matters.
fn dedup_by_packages(entries: &mut Vec<HistoryEntry>) {
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    entries.retain(|entry| seen.insert(entry.packages.clone()));
}

fn discard_corrupt_file(path: &Path, reason: String) -> Error {
    match fs::remove_file(path) {
        Ok(()) => warn!("Removed corrupt history file `{}`", path.display()),
        Err(e) => warn!("Could not remove corrupt history file `{}`: {e}", path.display()),
    }

    Error::CorruptHistory {
        path: path.to_path_buf(),
        reason,
    }
}
