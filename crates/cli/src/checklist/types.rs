//! Type definitions for the checklist and its UI state.
//!
//! All state transitions live here as pure functions of the current state and
//! the choice list, so they can be tested without a terminal.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use pnpm_pick_core::selection::ChoiceItem;

/// Message shown when the user submits with nothing checked.
pub const NOTHING_SELECTED_MESSAGE: &str = "At least one choice must be selected.";

/// Result of presenting the checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecklistOutcome {
    /// Indexes into the item list of the checked choices, in list order.
    Selected(Vec<usize>),
    Cancelled,
}

/// What a key press asks the checklist to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(CycleDirection),
    PageUp,
    PageDown,
    First,
    Last,
    Toggle,
    ToggleAll,
    Invert,
    StartFiltering,
    StopFiltering,
    FilterPush(char),
    FilterPop,
    Submit,
    Cancel,
    Nothing,
}

/// Direction to move the cursor in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleDirection {
    Up,
    Down,
}

/// State for the UI viewport.
///
/// Tracks the visible portion of the list when there are more rows than fit
/// on screen.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ViewportState {
    pub offset: usize,
    pub height: u16,
    pub width: u16,
}

impl ViewportState {
    fn rows(&self) -> usize {
        usize::from(self.height.max(1))
    }
}

/// Either the next state, or the end of the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Continue(UiState),
    Done(ChecklistOutcome),
}

/// Complete UI state for the checklist.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct UiState {
    /// Position of the cursor in the visible rows
    pub cursor: usize,
    /// Viewport state for scrolling
    pub viewport: ViewportState,
    /// Checked flag per item
    pub checked: Vec<bool>,
    /// Whether the user is currently filtering
    pub is_filtering: bool,
    /// Current filter text
    pub filter_text: String,
    /// Validation message for the status line
    pub error: Option<&'static str>,
}

impl UiState {
    #[must_use]
    pub fn new(items: &[ChoiceItem], viewport: ViewportState) -> Self {
        let mut state = Self {
            cursor: 0,
            viewport,
            checked: vec![false; items.len()],
            is_filtering: false,
            filter_text: String::new(),
            error: None,
        };
        state.cursor = state.first_selectable(items).unwrap_or(0);
        state
    }

    /// Item indexes currently shown, in list order.
    ///
    /// Separators are only shown when no filter text is entered.
    #[must_use]
    pub fn visible(&self, items: &[ChoiceItem]) -> Vec<usize> {
        if self.filter_text.is_empty() {
            return (0..items.len()).collect();
        }

        let matcher = SkimMatcherV2::default();
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let choice = item.as_choice()?;
                matcher
                    .fuzzy_match(&choice.label, &self.filter_text)
                    .map(|_| i)
            })
            .collect()
    }

    /// Item index under the cursor, if it is a choice.
    #[must_use]
    pub fn current(&self, items: &[ChoiceItem]) -> Option<usize> {
        let index = *self.visible(items).get(self.cursor)?;
        items.get(index)?.as_choice().map(|_| index)
    }

    /// Checked item indexes, in list order.
    #[must_use]
    pub fn checked_indexes(&self) -> Vec<usize> {
        self.checked
            .iter()
            .enumerate()
            .filter(|(_, checked)| **checked)
            .map(|(i, _)| i)
            .collect()
    }

    fn first_selectable(&self, items: &[ChoiceItem]) -> Option<usize> {
        self.visible(items)
            .iter()
            .position(|&i| items[i].as_choice().is_some())
    }

    fn last_selectable(&self, items: &[ChoiceItem]) -> Option<usize> {
        self.visible(items)
            .iter()
            .rposition(|&i| items[i].as_choice().is_some())
    }

    /// Moves the cursor by one choice, skipping separators. There is no
    /// wraparound: at either end the cursor stays put.
    #[must_use]
    pub fn move_cursor(&self, items: &[ChoiceItem], direction: CycleDirection) -> Self {
        let visible = self.visible(items);
        let is_choice = |position: &usize| items[visible[*position]].as_choice().is_some();

        let next = match direction {
            CycleDirection::Up => (0..self.cursor).rev().find(is_choice),
            CycleDirection::Down => (self.cursor + 1..visible.len()).find(is_choice),
        };

        match next {
            Some(cursor) => self.with_cursor(cursor),
            None => self.clone(),
        }
    }

    /// Moves the cursor by a page, landing on the nearest choice.
    #[must_use]
    pub fn move_page(&self, items: &[ChoiceItem], direction: CycleDirection) -> Self {
        let visible = self.visible(items);
        if visible.is_empty() {
            return self.clone();
        }

        let rows = self.viewport.rows();
        let target = match direction {
            CycleDirection::Up => self.cursor.saturating_sub(rows),
            CycleDirection::Down => (self.cursor + rows).min(visible.len() - 1),
        };

        let is_choice = |position: &usize| items[visible[*position]].as_choice().is_some();
        let landing = match direction {
            CycleDirection::Up => (target..=self.cursor).find(is_choice),
            CycleDirection::Down => (self.cursor..=target).rev().find(is_choice),
        };

        self.with_cursor(landing.unwrap_or(self.cursor))
    }

    fn with_cursor(&self, cursor: usize) -> Self {
        let mut state = self.clone();
        state.cursor = cursor;
        state.error = None;
        state.scroll_to_cursor();
        state
    }

    fn scroll_to_cursor(&mut self) {
        let rows = self.viewport.rows();
        if self.cursor < self.viewport.offset {
            self.viewport.offset = self.cursor;
        } else if self.cursor >= self.viewport.offset + rows {
            self.viewport.offset = self.cursor + 1 - rows;
        }
    }

    /// Flips the choice under the cursor.
    #[must_use]
    pub fn toggle(&self, items: &[ChoiceItem]) -> Self {
        let mut state = self.clone();
        if let Some(index) = self.current(items) {
            state.checked[index] = !state.checked[index];
            state.error = None;
        }
        state
    }

    /// Checks every visible choice, or unchecks them all if they already are.
    #[must_use]
    pub fn toggle_all(&self, items: &[ChoiceItem]) -> Self {
        let choices = self.visible_choices(items);
        let all_checked = choices.iter().all(|&i| self.checked[i]);

        let mut state = self.clone();
        for i in choices {
            state.checked[i] = !all_checked;
        }
        state.error = None;
        state
    }

    /// Inverts every visible choice.
    #[must_use]
    pub fn invert(&self, items: &[ChoiceItem]) -> Self {
        let mut state = self.clone();
        for i in self.visible_choices(items) {
            state.checked[i] = !state.checked[i];
        }
        state.error = None;
        state
    }

    fn visible_choices(&self, items: &[ChoiceItem]) -> Vec<usize> {
        self.visible(items)
            .into_iter()
            .filter(|&i| items[i].as_choice().is_some())
            .collect()
    }

    /// Replaces the filter text and puts the cursor on the first match.
    #[must_use]
    pub fn with_filter(&self, items: &[ChoiceItem], filter_text: String) -> Self {
        let mut state = self.clone();
        state.filter_text = filter_text;
        state.viewport.offset = 0;
        state.cursor = state.first_selectable(items).unwrap_or(0);
        state.error = None;
        state
    }

    /// Applies an action, returning the next state or the prompt's outcome.
    #[must_use]
    pub fn apply(&self, items: &[ChoiceItem], action: Action) -> Transition {
        let next = match action {
            Action::Move(direction) => self.move_cursor(items, direction),
            Action::PageUp => self.move_page(items, CycleDirection::Up),
            Action::PageDown => self.move_page(items, CycleDirection::Down),
            Action::First => self.with_cursor(self.first_selectable(items).unwrap_or(0)),
            Action::Last => self.with_cursor(self.last_selectable(items).unwrap_or(0)),
            Action::Toggle => self.toggle(items),
            Action::ToggleAll => self.toggle_all(items),
            Action::Invert => self.invert(items),
            Action::StartFiltering => {
                let mut state = self.clone();
                state.is_filtering = true;
                state
            }
            Action::StopFiltering => {
                let mut state = self.with_filter(items, String::new());
                state.is_filtering = false;
                state
            }
            Action::FilterPush(c) => {
                let mut filter_text = self.filter_text.clone();
                filter_text.push(c);
                self.with_filter(items, filter_text)
            }
            Action::FilterPop => {
                let mut filter_text = self.filter_text.clone();
                filter_text.pop();
                self.with_filter(items, filter_text)
            }
            Action::Submit => {
                let checked = self.checked_indexes();
                if !checked.is_empty() {
                    return Transition::Done(ChecklistOutcome::Selected(checked));
                }

                let mut state = self.clone();
                state.error = Some(NOTHING_SELECTED_MESSAGE);
                state
            }
            Action::Cancel => return Transition::Done(ChecklistOutcome::Cancelled),
            Action::Nothing => self.clone(),
        };

        Transition::Continue(next)
    }

    /// Adjusts the viewport to a new terminal size, keeping the cursor in view.
    #[must_use]
    pub fn resized(&self, viewport_height: u16, width: u16) -> Self {
        let mut state = self.clone();
        state.viewport.height = viewport_height;
        state.viewport.width = width;
        state.scroll_to_cursor();
        state
    }
}
