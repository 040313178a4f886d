// ABOUTME: TUI widget sub-modules for the transcript and the status bar.
// ABOUTME: Each widget is a pure rendering function over TUI state.

pub mod chat;
pub mod status;
