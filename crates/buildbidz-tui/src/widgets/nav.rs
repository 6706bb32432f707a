// Navigation row: the routes this user can reach, with their number keys.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use buildbidz_core::access::{self, Route};

use crate::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let entries: Vec<(String, Route)> = match &state.user {
        Some(user) => access::nav_routes(user)
            .into_iter()
            .enumerate()
            .map(|(i, route)| (format!("{}:{}", i + 1, route), route))
            .collect(),
        None => vec![
            ("h:Home".to_string(), Route::Landing),
            ("l:Sign in".to_string(), Route::Auth),
            ("a:About".to_string(), Route::About),
        ],
    };

    let mut spans = vec![Span::raw(" ")];
    for (label, route) in entries {
        let style = if route == state.route {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{label}]"), style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
