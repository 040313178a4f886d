// ABOUTME: TUI module: ratatui full-screen chat front end for a TexBot session.
// ABOUTME: Transcript display, draft input handling, status bar, and the controller loop.

pub mod controller;
pub mod input;
pub mod state;
pub mod ui;
pub mod widgets;

pub use controller::ChatController;
pub use state::TuiState;
