use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::types::{Action, CycleDirection};

/// Maps a key press to a checklist action.
#[must_use]
pub fn action_for_key(key_event: KeyEvent, is_filtering: bool) -> Action {
    if key_event.kind == KeyEventKind::Release {
        return Action::Nothing;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return match key_event.code {
            KeyCode::Char('c' | 'd') => Action::Cancel,
            KeyCode::Char('n') => Action::Move(CycleDirection::Down),
            KeyCode::Char('p') => Action::Move(CycleDirection::Up),
            _ => Action::Nothing,
        };
    }

    match key_event.code {
        KeyCode::Up => Action::Move(CycleDirection::Up),
        KeyCode::Down => Action::Move(CycleDirection::Down),
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Home => Action::First,
        KeyCode::End => Action::Last,
        KeyCode::Enter => Action::Submit,
        KeyCode::Tab | KeyCode::Char(' ') => Action::Toggle,
        KeyCode::Esc if is_filtering => Action::StopFiltering,
        KeyCode::Esc => Action::Cancel,
        KeyCode::Backspace if is_filtering => Action::FilterPop,
        KeyCode::Char(c) if is_filtering => Action::FilterPush(c),
        KeyCode::Char('k') => Action::Move(CycleDirection::Up),
        KeyCode::Char('j') => Action::Move(CycleDirection::Down),
        KeyCode::Char('a') => Action::ToggleAll,
        KeyCode::Char('i') => Action::Invert,
        KeyCode::Char('/') => Action::StartFiltering,
        _ => Action::Nothing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(action_for_key(key(KeyCode::Up), false), Action::Move(CycleDirection::Up));
        assert_eq!(action_for_key(key(KeyCode::Char('j')), false), Action::Move(CycleDirection::Down));
        assert_eq!(action_for_key(key(KeyCode::PageDown), false), Action::PageDown);
        assert_eq!(action_for_key(key(KeyCode::End), false), Action::Last);
    }

    #[test]
    fn test_selection_keys() {
        assert_eq!(action_for_key(key(KeyCode::Char(' ')), false), Action::Toggle);
        assert_eq!(action_for_key(key(KeyCode::Char('a')), false), Action::ToggleAll);
        assert_eq!(action_for_key(key(KeyCode::Char('i')), false), Action::Invert);
        assert_eq!(action_for_key(key(KeyCode::Enter), false), Action::Submit);
    }

    #[test]
    fn test_cancel_keys() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(action_for_key(ctrl_c, false), Action::Cancel);
        assert_eq!(action_for_key(ctrl_c, true), Action::Cancel);
        assert_eq!(action_for_key(key(KeyCode::Esc), false), Action::Cancel);
    }

    #[test]
    fn test_filtering_keys() {
        assert_eq!(action_for_key(key(KeyCode::Char('/')), false), Action::StartFiltering);
        assert_eq!(action_for_key(key(KeyCode::Char('a')), true), Action::FilterPush('a'));
        assert_eq!(action_for_key(key(KeyCode::Char('j')), true), Action::FilterPush('j'));
        assert_eq!(action_for_key(key(KeyCode::Backspace), true), Action::FilterPop);
        assert_eq!(action_for_key(key(KeyCode::Esc), true), Action::StopFiltering);
        // Space still toggles while filtering; package names have no spaces
        assert_eq!(action_for_key(key(KeyCode::Char(' ')), true), Action::Toggle);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut release = key(KeyCode::Enter);
        release.kind = KeyEventKind::Release;
        assert_eq!(action_for_key(release, false), Action::Nothing);
    }
}
