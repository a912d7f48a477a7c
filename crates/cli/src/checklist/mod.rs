//! Interactive package selection.
//!
//! This module provides the terminal checklist pnpm-pick shows before running
//! pnpm. The workflow only depends on the [`Checklist`] trait, so it can be
//! driven without a terminal.
//!
//! # User Interface
//!
//! The interface supports:
//! - Arrow keys or vim-style (j/k) navigation, without wraparound
//! - Space (or Tab) to check a choice, 'a' to check all, 'i' to invert
//! - '/' to filter choices by typing (fuzzy search)
//! - Enter to run with the checked choices
//! - Escape or Ctrl-C to cancel

pub mod input;
pub mod types;
pub mod ui;

use pnpm_pick_core::error::Result;
use pnpm_pick_core::selection::ChoiceItem;

// Re-exports for convenience
pub use types::ChecklistOutcome;
pub use ui::TerminalChecklist;

/// A multi-select prompt over a list of choices.
pub trait Checklist {
    /// Presents `items` and waits for the user to submit or cancel.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be displayed.
    fn present(&mut self, items: &[ChoiceItem]) -> Result<ChecklistOutcome>;
}
