// ABOUTME: Chat widget: renders transcript entries into styled ratatui Lines.
// ABOUTME: User and assistant entries get distinct prefixes; a typing line shows while busy.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::session::{ChatEntry, Role};

pub const USER_PREFIX: &str = "❯ ";
pub const ASSISTANT_PREFIX: &str = "⏺ ";
pub const TYPING_TEXT: &str = "TexBot is typing...";

/// Render transcript entries (plus the typing indicator while busy) into
/// styled Lines for display.
pub fn render_chat_lines(entries: &[ChatEntry], busy: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if entries.is_empty() && !busy {
        return welcome_lines();
    }

    for (idx, entry) in entries.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(""));
        }

        let (prefix, color) = match entry.role() {
            Role::User => (USER_PREFIX, Color::Green),
            Role::Assistant => (ASSISTANT_PREFIX, Color::Cyan),
        };

        // First line gets the prefix, subsequent lines are indented to match.
        for (i, text) in entry.text().split('\n').enumerate() {
            if i == 0 {
                lines.push(Line::from(vec![
                    Span::styled(
                        prefix,
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(text.to_string()),
                ]));
            } else {
                lines.push(Line::from(Span::raw(format!("  {}", text))));
            }
        }
    }

    if busy {
        if !entries.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(vec![
            Span::styled(
                ASSISTANT_PREFIX,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                TYPING_TEXT,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
        ]));
    }

    lines
}

fn welcome_lines() -> Vec<Line<'static>> {
    let dim = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::ITALIC);
    vec![
        Line::from(Span::styled(
            "Welcome to TexBot!",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Start a conversation about the textile industry.",
            dim,
        )),
    ]
}
