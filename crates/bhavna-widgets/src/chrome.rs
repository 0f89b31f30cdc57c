//! Border and banner helpers shared by the panels.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, Padding};

/// A bordered panel whose border color follows focus: cyan when focused,
/// dark gray otherwise.
pub fn focus_block(title: &str, focused: bool) -> Block<'_> {
    let color = if focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    Block::new()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(Line::from(format!(" {title} ")))
        .border_style(Style::default().fg(color))
}

/// A thick red block for transient error banners.
pub fn banner_block() -> Block<'static> {
    Block::new()
        .borders(Borders::ALL)
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(Color::Red))
        .padding(Padding::horizontal(1))
}

/// Text style for banner messages.
pub fn banner_style() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}
