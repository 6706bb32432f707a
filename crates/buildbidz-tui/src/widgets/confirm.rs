// Confirmation overlays: quit and delete.
//
// Centered modal dialogs drawn on top of the main layout while
// `ViewState::confirm_quit` or `ViewState::confirm_delete` is set.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

const QUIT_WIDTH: u16 = 28;
const DIALOG_HEIGHT: u16 = 5;

pub fn render_quit(frame: &mut Frame, area: Rect) {
    render_dialog(frame, area, " Quit? ", "Really quit?".to_string(), QUIT_WIDTH);
}

/// `what` names the record, e.g. "user u-7" or "this message".
pub fn render_delete(frame: &mut Frame, area: Rect, what: &str) {
    let prompt = format!("Delete {what}?");
    let width = (prompt.chars().count() as u16).saturating_add(14).max(QUIT_WIDTH);
    render_dialog(frame, area, " Delete? ", prompt, width);
}

fn render_dialog(frame: &mut Frame, area: Rect, title: &'static str, prompt: String, width: u16) {
    let dialog_area = centered_rect(width, DIALOG_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));

    let text = Line::from(vec![
        Span::raw(format!("  {prompt} (")),
        Span::styled("y", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw("/"),
        Span::styled("n", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(")"),
    ]);

    let paragraph = Paragraph::new(text)
        .block(block)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog_area);
}

/// A centered rectangle of the given size within `area`, clamped to the
/// available space.
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width);
    let clamped_height = height.min(area.height);

    let vertical = Layout::vertical([Constraint::Length(clamped_height)])
        .flex(Flex::Center)
        .split(area);

    let horizontal = Layout::horizontal([Constraint::Length(clamped_width)])
        .flex(Flex::Center)
        .split(vertical[0]);

    horizontal[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_centered() {
        let area = Rect::new(0, 0, 80, 24);
        let result = centered_rect(QUIT_WIDTH, DIALOG_HEIGHT, area);
        assert_eq!(result.width, QUIT_WIDTH);
        assert_eq!(result.height, DIALOG_HEIGHT);
        let dx = (result.x + result.width / 2) as i32 - 40;
        let dy = (result.y + result.height / 2) as i32 - 12;
        assert!(dx.unsigned_abs() <= 1, "off center by {dx} columns");
        assert!(dy.unsigned_abs() <= 1, "off center by {dy} rows");
    }

    #[test]
    fn centered_rect_clamps_to_small_area() {
        let area = Rect::new(0, 0, 10, 3);
        let result = centered_rect(QUIT_WIDTH, DIALOG_HEIGHT, area);
        assert!(result.width <= area.width);
        assert!(result.height <= area.height);
    }

    #[test]
    fn dialogs_render() {
        let text = crate::widgets::render_to_text(80, 24, |frame| {
            render_quit(frame, frame.area());
            render_delete(frame, frame.area(), "job j-42");
        });
        assert!(text.contains("Delete job j-42?"));
    }
}
