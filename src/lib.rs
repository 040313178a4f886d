// ABOUTME: Library root for texbot: re-exports all modules for integration testing.
// ABOUTME: The binary entry point is in main.rs, which uses this crate as a library.

pub mod app;
pub mod config;
pub mod logging;
pub mod prompt;
pub mod responder;
pub mod server;
pub mod session;
pub mod tui;
