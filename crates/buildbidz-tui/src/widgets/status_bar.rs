// Status bar: signed-in user, role, subscription state, unread counter.

use chrono::Utc;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use buildbidz_core::subscription;

use crate::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![Span::styled(
        " BuildBidz ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )];

    match &state.user {
        Some(user) => {
            spans.push(Span::styled(
                format!(" {} ", user.company_name),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!("({})", user.role),
                Style::default().fg(Color::Gray),
            ));
            let plan = subscription::describe(user, Utc::now());
            if !plan.is_empty() {
                spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
                spans.push(Span::styled(plan, Style::default().fg(Color::Cyan)));
            }
            spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
            spans.push(unread_span(state.unread_notifications));
        }
        None => spans.push(Span::styled(
            " not signed in",
            Style::default().fg(Color::Gray),
        )),
    }

    if state.loading {
        spans.push(Span::styled(
            "  loading…",
            Style::default().fg(Color::Yellow),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

fn unread_span(unread: u32) -> Span<'static> {
    if unread == 0 {
        Span::styled("no new notifications", Style::default().fg(Color::Gray))
    } else {
        Span::styled(
            format!("{unread} unread"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::signed_in;
    use crate::widgets::render_to_text;
    use buildbidz_core::access::Route;
    use buildbidz_core::model::Role;

    #[test]
    fn shows_company_role_and_unread() {
        let mut state = signed_in(Role::Supplier, Route::Dashboard);
        state.unread_notifications = 3;
        let text = render_to_text(100, 1, |frame| render(frame, frame.area(), &state));
        assert!(text.contains("u-1 Infra"));
        assert!(text.contains("(Supplier)"));
        assert!(text.contains("3 unread"));
    }

    #[test]
    fn signed_out() {
        let state = ViewState::default();
        let text = render_to_text(60, 1, |frame| render(frame, frame.area(), &state));
        assert!(text.contains("not signed in"));
    }
}
