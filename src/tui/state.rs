// ABOUTME: TUI state: mirrored transcript, busy flag, draft input buffer, and scroll position.
// ABOUTME: Kept in sync with the session through SessionEvent notifications.

use std::time::Instant;

use crate::session::{ChatEntry, SessionEvent};

/// Full TUI application state. The draft buffer lives here and nowhere else;
/// the session only sees it when it is submitted.
pub struct TuiState {
    pub entries: Vec<ChatEntry>,
    pub input: String,
    pub cursor_pos: usize,
    pub scroll_offset: u16,
    pub busy: bool,
    pub endpoint: String,
    pub session_start: Instant,
}

impl TuiState {
    /// Create a new empty TUI state for the given endpoint label.
    pub fn new(endpoint: String) -> Self {
        Self {
            entries: Vec::new(),
            input: String::new(),
            cursor_pos: 0,
            scroll_offset: 0,
            busy: false,
            endpoint,
            session_start: Instant::now(),
        }
    }

    /// Fold one session notification into the mirrored view.
    pub fn apply_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::EntryAppended(entry) => {
                self.entries.push(entry);
                self.scroll_offset = 0;
            }
            SessionEvent::BusyChanged(busy) => {
                self.busy = busy;
                self.scroll_offset = 0;
            }
        }
    }

    /// Replace the mirrored view wholesale, e.g. after missing notifications.
    pub fn resync(&mut self, entries: &[ChatEntry], busy: bool) {
        self.entries = entries.to_vec();
        self.busy = busy;
        self.scroll_offset = 0;
    }

    /// The draft as it would be submitted, or `None` if it is blank.
    /// The buffer itself is left alone until the submission is accepted.
    pub fn draft(&self) -> Option<String> {
        if self.input.trim().is_empty() {
            None
        } else {
            Some(self.input.clone())
        }
    }

    /// Clear the input buffer and reset the cursor.
    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor_pos = 0;
    }

    /// Clamp the cursor position to the valid character range of the input buffer.
    pub fn clamp_cursor(&mut self) {
        self.cursor_pos = self.cursor_pos.min(self.input_char_len());
    }

    /// Return the current cursor byte index in the UTF-8 input buffer.
    pub fn cursor_byte_index(&self) -> usize {
        char_index_to_byte_index(&self.input, self.cursor_pos)
    }

    /// Return the total number of characters in the input buffer.
    pub fn input_char_len(&self) -> usize {
        self.input.chars().count()
    }

    /// Insert a character at the cursor and advance by one character.
    pub fn insert_char_at_cursor(&mut self, c: char) {
        self.clamp_cursor();
        let byte_index = self.cursor_byte_index();
        self.input.insert(byte_index, c);
        self.cursor_pos += 1;
    }

    /// Insert a string at the cursor (paste).
    pub fn insert_str_at_cursor(&mut self, s: &str) {
        for c in s.chars().filter(|c| *c != '\r') {
            self.insert_char_at_cursor(c);
        }
    }

    /// Delete the character before the cursor (backspace behavior).
    pub fn backspace_char(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos == 0 {
            return;
        }

        let end = self.cursor_byte_index();
        let start = char_index_to_byte_index(&self.input, self.cursor_pos - 1);
        self.input.replace_range(start..end, "");
        self.cursor_pos -= 1;
    }

    /// Delete the character at the cursor (delete behavior).
    pub fn delete_char_at_cursor(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos >= self.input_char_len() {
            return;
        }

        let start = self.cursor_byte_index();
        let end = char_index_to_byte_index(&self.input, self.cursor_pos + 1);
        self.input.replace_range(start..end, "");
    }

    pub fn move_cursor_left(&mut self) {
        self.clamp_cursor();
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos < self.input_char_len() {
            self.cursor_pos += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_pos = self.input_char_len();
    }

    /// Split the input buffer into lines for display.
    pub fn input_lines(&self) -> Vec<&str> {
        self.input.split('\n').collect()
    }

    /// Number of lines in the input buffer (at least one).
    pub fn input_line_count(&self) -> usize {
        self.input_lines().len()
    }

    /// Zero-based line index containing the cursor.
    pub fn cursor_line(&self) -> usize {
        self.input
            .chars()
            .take(self.cursor_pos)
            .filter(|c| *c == '\n')
            .count()
    }

    /// Zero-based character column of the cursor within its line.
    pub fn cursor_column(&self) -> usize {
        self.input
            .chars()
            .take(self.cursor_pos)
            .collect::<Vec<_>>()
            .iter()
            .rev()
            .take_while(|c| **c != '\n')
            .count()
    }
}

fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    if char_index == 0 {
        return 0;
    }

    match s.char_indices().nth(char_index) {
        Some((idx, _)) => idx,
        None => s.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Role, Transcript};

    fn entry(role: Role, text: &str) -> ChatEntry {
        let mut transcript = Transcript::new();
        let id = transcript.append(role, text);
        transcript.get(id).cloned().unwrap()
    }

    #[test]
    fn new_state_is_empty() {
        let state = TuiState::new("http://127.0.0.1:8000/chats".to_string());
        assert!(state.entries.is_empty());
        assert_eq!(state.input, "");
        assert_eq!(state.cursor_pos, 0);
        assert_eq!(state.scroll_offset, 0);
        assert!(!state.busy);
        assert_eq!(state.endpoint, "http://127.0.0.1:8000/chats");
    }

    #[test]
    fn entry_event_appends_and_scrolls_to_bottom() {
        let mut state = TuiState::new("e".to_string());
        state.scroll_offset = 10;
        state.apply_event(SessionEvent::EntryAppended(entry(Role::User, "hello")));
        assert_eq!(state.scroll_offset, 0);
        assert_eq!(state.entries.len(), 1);
        assert_eq!(state.entries[0].text(), "hello");
    }

    #[test]
    fn busy_event_updates_flag() {
        let mut state = TuiState::new("e".to_string());
        state.apply_event(SessionEvent::BusyChanged(true));
        assert!(state.busy);
        state.apply_event(SessionEvent::BusyChanged(false));
        assert!(!state.busy);
    }

    #[test]
    fn resync_replaces_entries() {
        let mut state = TuiState::new("e".to_string());
        state.apply_event(SessionEvent::EntryAppended(entry(Role::User, "old")));
        let fresh = vec![entry(Role::User, "a"), entry(Role::Assistant, "b")];
        state.resync(&fresh, true);
        assert_eq!(state.entries.len(), 2);
        assert!(state.busy);
    }

    #[test]
    fn draft_keeps_raw_text_and_buffer() {
        let mut state = TuiState::new("e".to_string());
        state.input = "  hello world  ".to_string();
        state.cursor_pos = 10;
        assert_eq!(state.draft(), Some("  hello world  ".to_string()));
        assert_eq!(state.input, "  hello world  ", "draft() does not consume");
        state.clear_input();
        assert_eq!(state.input, "");
        assert_eq!(state.cursor_pos, 0);
    }

    #[test]
    fn blank_draft_is_none() {
        let mut state = TuiState::new("e".to_string());
        state.input = "   ".to_string();
        assert_eq!(state.draft(), None);
    }

    #[test]
    fn utf8_input_editing_is_safe() {
        let mut state = TuiState::new("e".to_string());
        state.insert_char_at_cursor('a');
        state.insert_char_at_cursor('🙂');
        state.insert_char_at_cursor('é');
        assert_eq!(state.input, "a🙂é");
        assert_eq!(state.cursor_pos, 3);

        state.move_cursor_left();
        state.backspace_char();
        assert_eq!(state.input, "aé");
        assert_eq!(state.cursor_pos, 1);

        state.delete_char_at_cursor();
        assert_eq!(state.input, "a");
        assert_eq!(state.cursor_pos, 1);
    }

    #[test]
    fn paste_strips_carriage_returns() {
        let mut state = TuiState::new("e".to_string());
        state.insert_str_at_cursor("line1\r\nline2");
        assert_eq!(state.input, "line1\nline2");
        assert_eq!(state.input_line_count(), 2);
        assert_eq!(state.cursor_line(), 1);
        assert_eq!(state.cursor_column(), 5);
    }

    #[test]
    fn clamp_cursor_handles_out_of_range_positions() {
        let mut state = TuiState::new("e".to_string());
        state.input = "hi🙂".to_string();
        state.cursor_pos = 999;
        state.clamp_cursor();
        assert_eq!(state.cursor_pos, 3);
        assert_eq!(state.cursor_byte_index(), state.input.len());
    }
}
