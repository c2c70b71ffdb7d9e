// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into local ViewState edits (typing, focus,
// toggles) or into UserCommand messages for the app orchestrator (submit,
// quit).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::ViewState;
use crate::protocol::UserCommand;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app orchestrator. Returns `None` when it was handled locally, or ignored
/// because a request is pending.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // On Windows crossterm reports Press and Release for each keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);

    // Ctrl+C always quits, even mid-request.
    if ctrl && key_event.code == KeyCode::Char('c') {
        return Some(UserCommand::Quit);
    }

    // The form is locked while a request is in flight.
    if view_state.is_pending() {
        return None;
    }

    if ctrl {
        match key_event.code {
            KeyCode::Char('t') => {
                let mode = view_state.mode.toggle();
                view_state.set_mode(mode);
            }
            KeyCode::Char('p') => {
                view_state.progress_enabled = !view_state.progress_enabled;
            }
            _ => {}
        }
        return None;
    }

    match key_event.code {
        KeyCode::Enter => Some(UserCommand::Submit(view_state.submit_request())),
        KeyCode::Tab | KeyCode::Down => {
            view_state.move_focus(1);
            None
        }
        KeyCode::BackTab | KeyCode::Up => {
            view_state.move_focus(-1);
            None
        }
        KeyCode::Backspace => {
            view_state.fields.get_mut(view_state.focus).pop();
            None
        }
        KeyCode::Esc => {
            view_state.error = None;
            None
        }
        KeyCode::Char(c) => {
            view_state.fields.push_char(view_state.focus, c);
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormField, InputMode};
    use crate::protocol::Phase;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str(state: &mut ViewState, text: &str) {
        for c in text.chars() {
            assert_eq!(handle_key(key(KeyCode::Char(c)), state), None);
        }
    }

    #[test]
    fn typing_fills_focused_field_uppercased_for_plate() {
        let mut state = ViewState::default();
        type_str(&mut state, "abc123");
        assert_eq!(state.fields.plate, "ABC123");
    }

    #[test]
    fn backspace_removes_last_char() {
        let mut state = ViewState::default();
        type_str(&mut state, "AB");
        handle_key(key(KeyCode::Backspace), &mut state);
        assert_eq!(state.fields.plate, "A");
    }

    #[test]
    fn tab_moves_to_mileage_which_accepts_digits_only() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.focus, FormField::Kilometers);
        type_str(&mut state, "5x0k000");
        assert_eq!(state.fields.kilometers, "50000");
    }

    #[test]
    fn backtab_moves_backwards() {
        let mut state = ViewState::default();
        state.set_mode(InputMode::Vehicle);
        handle_key(key(KeyCode::BackTab), &mut state);
        assert_eq!(state.focus, FormField::Kilometers);
    }

    #[test]
    fn ctrl_t_toggles_input_mode() {
        let mut state = ViewState::default();
        assert_eq!(handle_key(ctrl('t'), &mut state), None);
        assert_eq!(state.mode, InputMode::Vehicle);
        assert_eq!(state.focus, FormField::Brand);
        handle_key(ctrl('t'), &mut state);
        assert_eq!(state.mode, InputMode::Plate);
    }

    #[test]
    fn ctrl_p_toggles_progress() {
        let mut state = ViewState::default();
        handle_key(ctrl('p'), &mut state);
        assert!(!state.progress_enabled);
        handle_key(ctrl('p'), &mut state);
        assert!(state.progress_enabled);
    }

    #[test]
    fn ctrl_chars_are_not_typed() {
        let mut state = ViewState::default();
        handle_key(ctrl('x'), &mut state);
        assert!(state.fields.plate.is_empty());
    }

    #[test]
    fn enter_submits_snapshot() {
        let mut state = ViewState::default();
        type_str(&mut state, "abc123");
        match handle_key(key(KeyCode::Enter), &mut state) {
            Some(UserCommand::Submit(request)) => {
                assert_eq!(request.mode, InputMode::Plate);
                assert_eq!(request.fields.plate, "ABC123");
                assert!(request.progress_enabled);
            }
            other => panic!("expected Submit, got {other:?}"),
        }
    }

    #[test]
    fn pending_blocks_everything_but_ctrl_c() {
        let mut state = ViewState::default();
        state.phase = Phase::Progressing;

        assert_eq!(handle_key(key(KeyCode::Char('a')), &mut state), None);
        assert_eq!(handle_key(key(KeyCode::Enter), &mut state), None);
        assert_eq!(handle_key(ctrl('t'), &mut state), None);
        assert!(state.fields.plate.is_empty());
        assert_eq!(state.mode, InputMode::Plate);

        assert_eq!(handle_key(ctrl('c'), &mut state), Some(UserCommand::Quit));
    }

    #[test]
    fn esc_dismisses_error() {
        let mut state = ViewState::default();
        state.error = Some("The plate is required".into());
        handle_key(key(KeyCode::Esc), &mut state);
        assert!(state.error.is_none());
    }

    #[test]
    fn release_events_are_ignored() {
        let mut state = ViewState::default();
        let mut event = key(KeyCode::Char('a'));
        event.kind = KeyEventKind::Release;
        assert_eq!(handle_key(event, &mut state), None);
        assert!(state.fields.plate.is_empty());
    }
}
