// ABOUTME: Tracing subscriber setup: stderr for headless commands, a log file under the TUI.
// ABOUTME: RUST_LOG overrides the verbosity chosen with -v/-vv.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Where log lines go.
pub enum LogTarget<'a> {
    Stderr,
    /// Append to a file; used while the terminal UI owns the screen.
    File(&'a Path),
}

/// Map `-v` repetitions to a default filter directive.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Call once, early in `main`.
pub fn init_logging(verbosity: u8, target: LogTarget<'_>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)));

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .with(filter)
                .try_init()?;
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .with(filter)
                .try_init()?;
        }
    }
    Ok(())
}
