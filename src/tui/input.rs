// ABOUTME: Keyboard input handling for the TUI: translates key events into actions.
// ABOUTME: Edits the draft buffer, scrolls the transcript, and emits submit/quit requests.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::state::TuiState;

/// Lines scrolled per PageUp/PageDown.
const PAGE_SCROLL: u16 = 10;

/// The result of processing a key event.
#[derive(Debug, PartialEq)]
pub enum InputResult {
    /// No action needed.
    None,
    /// User submitted the draft. The buffer is cleared only once the
    /// session accepts it.
    Send(String),
    /// User wants to quit.
    Quit,
}

/// Process a key event against the current TUI state and return the resulting action.
pub fn handle_key(state: &mut TuiState, key: KeyEvent) -> InputResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('d')) {
        return InputResult::Quit;
    }

    // Ctrl+U clears the draft, like the input's clear button.
    if ctrl && key.code == KeyCode::Char('u') {
        state.clear_input();
        return InputResult::None;
    }

    match key.code {
        KeyCode::PageUp => {
            state.scroll_offset = state.scroll_offset.saturating_add(PAGE_SCROLL);
            InputResult::None
        }
        KeyCode::PageDown => {
            state.scroll_offset = state.scroll_offset.saturating_sub(PAGE_SCROLL);
            InputResult::None
        }
        KeyCode::Up => {
            state.scroll_offset = state.scroll_offset.saturating_add(1);
            InputResult::None
        }
        KeyCode::Down => {
            state.scroll_offset = state.scroll_offset.saturating_sub(1);
            InputResult::None
        }
        // Shift+Enter inserts a newline into the draft.
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
            state.insert_char_at_cursor('\n');
            InputResult::None
        }
        KeyCode::Enter => match state.draft() {
            Some(text) => InputResult::Send(text),
            None => InputResult::None,
        },
        KeyCode::Char(c) => {
            state.insert_char_at_cursor(c);
            InputResult::None
        }
        KeyCode::Backspace => {
            state.backspace_char();
            InputResult::None
        }
        KeyCode::Delete => {
            state.delete_char_at_cursor();
            InputResult::None
        }
        KeyCode::Left => {
            state.move_cursor_left();
            InputResult::None
        }
        KeyCode::Right => {
            state.move_cursor_right();
            InputResult::None
        }
        KeyCode::Home => {
            state.move_cursor_home();
            InputResult::None
        }
        KeyCode::End => {
            state.move_cursor_end();
            InputResult::None
        }
        KeyCode::Esc => InputResult::Quit,
        _ => InputResult::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn make_ctrl_key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn state() -> TuiState {
        TuiState::new("test".to_string())
    }

    #[test]
    fn typing_appends_to_input() {
        let mut state = state();
        handle_key(&mut state, make_key(KeyCode::Char('h')));
        handle_key(&mut state, make_key(KeyCode::Char('i')));
        assert_eq!(state.input, "hi");
        assert_eq!(state.cursor_pos, 2);
    }

    #[test]
    fn enter_submits_without_clearing() {
        let mut state = state();
        state.input = "What is wool?".to_string();
        let result = handle_key(&mut state, make_key(KeyCode::Enter));
        assert_eq!(result, InputResult::Send("What is wool?".to_string()));
        assert_eq!(state.input, "What is wool?");
    }

    #[test]
    fn enter_on_blank_does_nothing() {
        let mut state = state();
        state.input = "   ".to_string();
        let result = handle_key(&mut state, make_key(KeyCode::Enter));
        assert_eq!(result, InputResult::None);
    }

    #[test]
    fn enter_while_busy_still_reports_send() {
        let mut state = state();
        state.busy = true;
        state.input = "b".to_string();
        let result = handle_key(&mut state, make_key(KeyCode::Enter));
        assert_eq!(result, InputResult::Send("b".to_string()));
    }

    #[test]
    fn backspace_deletes() {
        let mut state = state();
        state.input = "abc".to_string();
        state.cursor_pos = 3;
        handle_key(&mut state, make_key(KeyCode::Backspace));
        assert_eq!(state.input, "ab");
        assert_eq!(state.cursor_pos, 2);
    }

    #[test]
    fn ctrl_c_and_esc_quit() {
        let mut state = state();
        assert_eq!(handle_key(&mut state, make_ctrl_key('c')), InputResult::Quit);
        assert_eq!(handle_key(&mut state, make_ctrl_key('d')), InputResult::Quit);
        assert_eq!(handle_key(&mut state, make_key(KeyCode::Esc)), InputResult::Quit);
    }

    #[test]
    fn ctrl_u_clears_draft() {
        let mut state = state();
        state.input = "never mind".to_string();
        state.cursor_pos = 5;
        assert_eq!(handle_key(&mut state, make_ctrl_key('u')), InputResult::None);
        assert_eq!(state.input, "");
        assert_eq!(state.cursor_pos, 0);
    }

    #[test]
    fn scroll_keys_move_offset() {
        let mut state = state();
        handle_key(&mut state, make_key(KeyCode::PageUp));
        assert_eq!(state.scroll_offset, 10);
        handle_key(&mut state, make_key(KeyCode::Up));
        assert_eq!(state.scroll_offset, 11);
        handle_key(&mut state, make_key(KeyCode::Down));
        assert_eq!(state.scroll_offset, 10);
        handle_key(&mut state, make_key(KeyCode::PageDown));
        handle_key(&mut state, make_key(KeyCode::PageDown));
        assert_eq!(state.scroll_offset, 0);
    }

    #[test]
    fn shift_enter_inserts_newline() {
        let mut state = state();
        state.input = "line1".to_string();
        state.cursor_pos = 5;
        let result = handle_key(
            &mut state,
            KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT),
        );
        assert_eq!(result, InputResult::None);
        assert_eq!(state.input, "line1\n");
    }

    #[test]
    fn unicode_editing_through_key_events() {
        let mut state = state();
        handle_key(&mut state, make_key(KeyCode::Char('a')));
        handle_key(&mut state, make_key(KeyCode::Char('é')));
        handle_key(&mut state, make_key(KeyCode::Home));
        handle_key(&mut state, make_key(KeyCode::Delete));
        assert_eq!(state.input, "é");
        handle_key(&mut state, make_key(KeyCode::End));
        assert_eq!(state.cursor_pos, 1);
        handle_key(&mut state, make_key(KeyCode::Left));
        handle_key(&mut state, make_key(KeyCode::Right));
        assert_eq!(state.cursor_pos, 1);
    }
}
