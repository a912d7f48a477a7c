use std::io::{stdout, Write};

use crossterm::cursor::{self, MoveTo};
use crossterm::event::{self, Event};
use crossterm::style::Color::{Cyan, DarkGreen, DarkGrey, Green, Magenta, Red, Reset, Yellow};
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{queue, ExecutableCommand};
use pnpm_pick_core::error::Result;
use pnpm_pick_core::selection::{Choice, ChoiceItem, ChoiceKind};

use super::input::action_for_key;
use super::types::{ChecklistOutcome, Transition, UiState, ViewportState};
use super::Checklist;

/// Rows used by the header, description and status lines.
const VIEWPORT_MARGIN: u16 = 3;

const HELP: &str = "↑↓ move · space toggle · a all · i invert · / filter · enter run · esc cancel";

struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        // Restore the terminal on drop
        let _ = disable_raw_mode();
        let mut stdout = stdout();
        let _ = stdout.execute(cursor::Show);
        let _ = stdout.execute(LeaveAlternateScreen);
    }
}

/// The checklist drawn on the terminal with crossterm.
#[derive(Debug, Clone)]
pub struct TerminalChecklist {
    message: String,
}

impl TerminalChecklist {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for TerminalChecklist {
    fn default() -> Self {
        Self::new("Select packages to run")
    }
}

fn viewport_height(terminal_height: u16) -> u16 {
    terminal_height.saturating_sub(VIEWPORT_MARGIN).max(1)
}

impl Checklist for TerminalChecklist {
    fn present(&mut self, items: &[ChoiceItem]) -> Result<ChecklistOutcome> {
        let mut stdout = stdout();
        stdout.execute(EnterAlternateScreen)?;
        enable_raw_mode()?;

        let _raw_mode_guard = RawModeGuard; // When this goes out of scope, the terminal is restored
        stdout.execute(cursor::Hide)?;

        let (width, height) = terminal::size()?;
        let mut ui_state = UiState::new(
            items,
            ViewportState {
                offset: 0,
                height: viewport_height(height),
                width,
            },
        );

        redraw_ui(&self.message, &ui_state, items)?;

        loop {
            let new_ui_state = match event::read()? {
                Event::Key(key_event) => {
                    let action = action_for_key(key_event, ui_state.is_filtering);
                    match ui_state.apply(items, action) {
                        Transition::Done(outcome) => return Ok(outcome),
                        Transition::Continue(state) => state,
                    }
                }
                Event::Resize(width, height) => ui_state.resized(viewport_height(height), width),
                _ => continue,
            };

            if new_ui_state != ui_state {
                ui_state = new_ui_state;
                redraw_ui(&self.message, &ui_state, items)?;
            }
        }
    }
}

fn redraw_ui(message: &str, ui_state: &UiState, items: &[ChoiceItem]) -> Result<()> {
    let mut stdout = stdout();

    queue!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;

    print_header(message, ui_state)?;

    let visible = ui_state.visible(items);
    let viewport = &ui_state.viewport;

    if visible.is_empty() {
        queue!(
            stdout,
            MoveTo(0, 1),
            SetForegroundColor(Red),
            Print("No matching packages!"),
            SetAttribute(Attribute::Reset),
        )?;
    }

    let rows = visible
        .iter()
        .enumerate()
        .skip(viewport.offset)
        .take(usize::from(viewport.height));

    for (row, (position, &index)) in (1u16..).zip(rows) {
        queue!(stdout, MoveTo(0, row))?;
        if let ChoiceItem::Choice(choice) = &items[index] {
            print_choice_row(
                choice,
                ui_state.checked[index],
                position == ui_state.cursor,
                viewport.width,
            )?;
        }
    }

    let footer_row = viewport.height.saturating_add(1);
    let description = ui_state
        .current(items)
        .and_then(|index| items[index].as_choice())
        .and_then(|choice| choice.description.clone())
        .unwrap_or_default();

    queue!(
        stdout,
        MoveTo(0, footer_row),
        SetForegroundColor(DarkGrey),
        Print(truncate(&description, viewport.width)),
        SetForegroundColor(Reset),
        MoveTo(0, footer_row.saturating_add(1)),
    )?;

    if let Some(error) = ui_state.error {
        queue!(
            stdout,
            SetForegroundColor(Red),
            Print(format!("> {error}")),
            SetForegroundColor(Reset),
        )?;
    } else if ui_state.is_filtering {
        queue!(
            stdout,
            SetAttribute(Attribute::Bold),
            Print(format!("Filter: {}", ui_state.filter_text)),
            SetAttribute(Attribute::Reset),
        )?;
    }

    stdout.flush()?;
    Ok(())
}

/// Header text: the prompt message, the checked count and the key help.
fn header_content(message: &str, ui_state: &UiState) -> String {
    let checked = ui_state.checked.iter().filter(|checked| **checked).count();
    let mode = if ui_state.is_filtering {
        " [filtering, esc to stop]"
    } else {
        ""
    };

    format!("  {message} ({checked} selected){mode}   {HELP}")
}

fn print_header(message: &str, ui_state: &UiState) -> Result<()> {
    let mut stdout = stdout();

    queue!(
        stdout,
        MoveTo(0, 0),
        SetBackgroundColor(DarkGreen),
        Print(pad_to_width(
            &header_content(message, ui_state),
            ui_state.viewport.width
        )),
        SetBackgroundColor(Reset),
        SetForegroundColor(Reset),
    )?;

    Ok(())
}

fn kind_color(kind: ChoiceKind) -> Color {
    match kind {
        ChoiceKind::Group => Cyan,
        ChoiceKind::History => Magenta,
        ChoiceKind::Package => Reset,
    }
}

fn print_choice_row(choice: &Choice, is_checked: bool, is_selected: bool, width: u16) -> Result<()> {
    let mut stdout = stdout();

    let pointer = if is_selected { "❯" } else { " " };
    let checkbox = if is_checked { "◉" } else { "◯" };
    let content = format!("{pointer} {checkbox} {choice}");

    if is_selected {
        queue!(stdout, SetAttribute(Attribute::Bold), SetForegroundColor(Yellow))?;
    } else if is_checked {
        queue!(stdout, SetForegroundColor(Green))?;
    } else {
        queue!(stdout, SetForegroundColor(kind_color(choice.kind)))?;
    }

    queue!(
        stdout,
        Print(truncate(&content, width)),
        SetAttribute(Attribute::Reset),
        SetForegroundColor(Reset),
    )?;

    Ok(())
}

fn truncate(text: &str, width: u16) -> String {
    text.chars().take(usize::from(width)).collect()
}

fn pad_to_width(text: &str, width: u16) -> String {
    let truncated = truncate(text, width);
    let padding = usize::from(width).saturating_sub(truncated.chars().count());
    format!("{truncated}{}", " ".repeat(padding))
}
