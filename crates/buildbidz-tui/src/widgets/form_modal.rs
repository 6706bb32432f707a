// Form modal: labelled fields, the focused one marked, inline error below.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::confirm::centered_rect;
use crate::form::FormState;

const MODAL_WIDTH: u16 = 76;
const LABEL_WIDTH: usize = 36;

pub fn render(frame: &mut Frame, area: Rect, form: &FormState) {
    // Fields, a blank line, status line, borders.
    let height = form.fields.len() as u16 + 4;
    let modal = centered_rect(MODAL_WIDTH, height, area);
    frame.render_widget(Clear, modal);

    let mut lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let focused = i == form.focus;
            let value = if field.secret {
                "*".repeat(field.value.chars().count())
            } else {
                field.value.clone()
            };
            let cursor = if focused { "_" } else { "" };
            let label_style = if focused {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(vec![
                Span::styled(if focused { "> " } else { "  " }, label_style),
                Span::styled(format!("{:<LABEL_WIDTH$}", field.label), label_style),
                Span::raw(format!("{value}{cursor}")),
            ])
        })
        .collect();

    lines.push(Line::from(""));
    lines.push(status_line(form));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(
            format!(" {} ", form.title()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block)
            .style(Style::default().bg(Color::Black)),
        modal,
    );
}

fn status_line(form: &FormState) -> Line<'static> {
    if let Some(error) = &form.error {
        return Line::from(Span::styled(
            format!("  {error}"),
            Style::default().fg(Color::Red),
        ));
    }
    if form.submitting {
        return Line::from(Span::styled(
            "  Submitting…",
            Style::default().fg(Color::Cyan),
        ));
    }
    Line::from(Span::styled(
        "  Enter to submit, Esc to cancel",
        Style::default().fg(Color::DarkGray),
    ))
}
