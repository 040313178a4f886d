// ABOUTME: Status bar widget: renders endpoint, message count, session time, and busy indicator.
// ABOUTME: Displayed at the bottom of the TUI as a single-line summary.

use std::time::Instant;

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Everything the status bar shows.
pub struct StatusBarParams<'a> {
    pub endpoint: &'a str,
    pub message_count: usize,
    pub session_start: Instant,
    pub busy: bool,
}

/// Render the status bar line.
pub fn status_line(params: &StatusBarParams<'_>) -> Line<'static> {
    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = vec![
        Span::styled(
            format!(" {} ", params.endpoint),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled("| ", dim),
        Span::styled(
            format!("{} messages ", params.message_count),
            Style::default().fg(Color::White),
        ),
        Span::styled("| ", dim),
        Span::styled(
            format!("{} ", format_elapsed(params.session_start.elapsed().as_secs())),
            Style::default().fg(Color::White),
        ),
    ];

    if params.busy {
        spans.push(Span::styled("| ", dim));
        spans.push(Span::styled(
            "sending... ",
            Style::default().fg(Color::Yellow),
        ));
    }

    Line::from(spans)
}

/// Format a duration in seconds as `Xm YYs`, or `Xh YYm` past an hour.
pub fn format_elapsed(secs: u64) -> String {
    if secs >= 3600 {
        format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}
