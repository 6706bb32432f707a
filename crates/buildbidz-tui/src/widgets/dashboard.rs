// Dashboard for buyers, suppliers and salesmen: role statistics.

use chrono::Utc;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use buildbidz_core::access::{self, DashboardKind};
use buildbidz_core::subscription;

use super::panel;
use crate::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(user) = &state.user else {
        return;
    };

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(3)])
        .split(area);

    let title = match access::dashboard_kind(user) {
        DashboardKind::Salesman => "Salesman dashboard",
        _ => "Dashboard",
    };

    let stats: Vec<Line> = match &state.dashboard {
        Some(stats) => stats
            .rows()
            .into_iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(format!("{label:<16}"), Style::default().fg(Color::Gray)),
                    Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
                ])
            })
            .collect(),
        None if state.loading => vec![Line::from("Loading statistics…")],
        None => vec![Line::from("No statistics yet. Press R to refresh.")],
    };
    frame.render_widget(Paragraph::new(stats).block(panel(title)), sections[0]);

    let now = Utc::now();
    let mut notes = vec![Line::from(format!("Signed in as {} <{}>", user.company_name, user.email))];
    let plan = subscription::describe(user, now);
    if !plan.is_empty() {
        let style = if subscription::needs_subscription(user, now) {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };
        notes.push(Line::from(Span::styled(plan, style)));
    }
    notes.push(Line::from(match access::dashboard_kind(user) {
        DashboardKind::Salesman => "Browse open jobs and bid on behalf of your client companies.",
        _ if user.role == buildbidz_core::model::Role::Buyer => {
            "Post a job from the Jobs tab; review and award bids from the Bids tab."
        }
        _ => "Browse open jobs and submit your quotes from the Jobs tab.",
    }));
    frame.render_widget(
        Paragraph::new(notes)
            .wrap(Wrap { trim: true })
            .block(panel("Account")),
        sections[1],
    );
}
