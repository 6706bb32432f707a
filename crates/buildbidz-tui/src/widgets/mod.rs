// Widget modules, one per screen zone or view.

pub mod admin;
pub mod banner;
pub mod bids;
pub mod chat;
pub mod confirm;
pub mod dashboard;
pub mod form_modal;
pub mod help_bar;
pub mod jobs;
pub mod landing;
pub mod nav;
pub mod notifications;
pub mod settings;
pub mod status_bar;
pub mod subscription;

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};

/// Bordered panel with a title, the frame every view draws in.
pub(crate) fn panel(title: impl Into<String>) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title.into()))
}

pub(crate) fn header_style() -> Style {
    Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn highlight_style() -> Style {
    Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD)
}

/// Draw into a test backend and return the buffer as one string.
#[cfg(test)]
pub(crate) fn render_to_text(
    width: u16,
    height: u16,
    draw: impl FnOnce(&mut ratatui::Frame),
) -> String {
    let backend = ratatui::backend::TestBackend::new(width, height);
    let mut terminal = ratatui::Terminal::new(backend).unwrap();
    terminal.draw(draw).unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|c| c.symbol())
        .collect()
}
