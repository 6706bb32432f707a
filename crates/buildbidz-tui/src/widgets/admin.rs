// Admin dashboard: platform totals, the users/jobs/bids tables, and a side
// pane for user details or chat analytics.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;

use buildbidz_core::api::AdminTable;
use buildbidz_core::format::{format_date, format_price, truncate};
use buildbidz_core::model::{ChatAnalytics, UserDetails};

use super::bids::bid_style;
use super::jobs::status_style;
use super::{header_style, highlight_style, panel};
use crate::layout::split_main;
use crate::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    render_totals(frame, sections[0], state);

    let (table_area, side_area) = split_main(sections[1]);
    render_table(frame, table_area, state);

    if let Some(details) = &state.user_details {
        render_user_details(frame, side_area, details);
    } else if let Some(analytics) = &state.chat_analytics {
        render_analytics(frame, side_area, analytics);
    } else {
        frame.render_widget(
            Paragraph::new("Enter on a user shows details. y shows chat analytics.")
                .wrap(Wrap { trim: true })
                .block(panel("Details")),
            side_area,
        );
    }
}

fn render_totals(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = Vec::new();
    if let Some(stats) = &state.dashboard {
        for (label, value) in stats.rows() {
            spans.push(Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)));
            spans.push(Span::styled(
                format!("{value}   "),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(panel("Admin dashboard")),
        area,
    );
}

fn table_tabs(active: AdminTable) -> String {
    AdminTable::ALL
        .iter()
        .map(|t| {
            if *t == active {
                format!("[{t}]")
            } else {
                t.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_table(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (header, rows, widths): (Row, Vec<Row>, Vec<Constraint>) = match state.admin_table {
        AdminTable::Users => (
            Row::new(vec!["Company", "Email", "Role", "Plan", "Joined"]),
            state
                .admin_users
                .iter()
                .map(|u| {
                    Row::new(vec![
                        Cell::from(truncate(&u.company_name, 24)),
                        Cell::from(truncate(&u.email, 28)),
                        Cell::from(u.role.to_string()),
                        Cell::from(u.subscription_status.label()),
                        Cell::from(format_date(u.created_at)),
                    ])
                })
                .collect(),
            vec![
                Constraint::Min(12),
                Constraint::Min(16),
                Constraint::Length(9),
                Constraint::Length(10),
                Constraint::Length(11),
            ],
        ),
        AdminTable::Jobs => (
            Row::new(vec!["Title", "Category", "Status", "Posted"]),
            state
                .admin_jobs
                .iter()
                .map(|j| {
                    Row::new(vec![
                        Cell::from(truncate(&j.title, 32)),
                        Cell::from(j.category.to_string()),
                        Cell::from(Span::styled(j.status.to_string(), status_style(j.status))),
                        Cell::from(format_date(j.created_at)),
                    ])
                })
                .collect(),
            vec![
                Constraint::Min(16),
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Length(11),
            ],
        ),
        AdminTable::Bids => (
            Row::new(vec!["Bidder", "Job", "Price", "Status"]),
            state
                .admin_bids
                .iter()
                .map(|b| {
                    Row::new(vec![
                        Cell::from(truncate(b.bidder_name(), 24)),
                        Cell::from(truncate(&b.job_id, 14)),
                        Cell::from(format_price(b.price_quote)),
                        Cell::from(Span::styled(b.status.to_string(), bid_style(b.status))),
                    ])
                })
                .collect(),
            vec![
                Constraint::Min(12),
                Constraint::Length(14),
                Constraint::Length(12),
                Constraint::Length(10),
            ],
        ),
    };

    let count = rows.len();
    let table = Table::new(rows, widths)
        .header(header.style(header_style()))
        .block(panel(format!("{} ({count})", table_tabs(state.admin_table))))
        .row_highlight_style(highlight_style())
        .highlight_symbol(">> ");
    let mut table_state = TableState::default().with_selected((count > 0).then_some(state.selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn render_user_details(frame: &mut Frame, area: Rect, details: &UserDetails) {
    let user = &details.user;
    let mut lines = vec![
        Line::from(Span::styled(
            user.company_name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("{} | {}", user.email, user.role)),
        Line::from(format!("Phone: {}", user.contact_phone)),
        Line::from(format!("Plan: {}", user.subscription_status.label())),
        Line::from(format!(
            "Jobs posted: {}   Bids submitted: {}",
            details.jobs_posted, details.bids_submitted
        )),
        Line::from(""),
    ];
    for job in details.jobs.iter().take(5) {
        lines.push(Line::from(format!("job  {} ({})", truncate(&job.title, 30), job.status)));
    }
    for bid in details.bids.iter().take(5) {
        lines.push(Line::from(format!(
            "bid  {} on {} ({})",
            format_price(bid.price_quote),
            truncate(&bid.job_id, 12),
            bid.status
        )));
    }
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(panel("User details")),
        area,
    );
}

fn render_analytics(frame: &mut Frame, area: Rect, analytics: &ChatAnalytics) {
    let d = analytics.message_distribution;
    let lines = vec![
        Line::from(format!("Total messages:       {}", analytics.total_messages)),
        Line::from(format!("Active conversations: {}", analytics.active_conversations)),
        Line::from(""),
        Line::from(format!("Last 24 hours:  {}", d.last_24_hours)),
        Line::from(format!("Last week:      {}", d.last_week)),
        Line::from(format!("Last month:     {}", d.last_month)),
        Line::from(format!("Older:          {}", d.older_than_month)),
        Line::from(""),
        Line::from(format!(
            "Oldest message: {}",
            format_date(analytics.oldest_message_date)
        )),
    ];
    frame.render_widget(Paragraph::new(lines).block(panel("Chat analytics")), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply_ui_update;
    use crate::test_support::{signed_in, user};
    use crate::widgets::render_to_text;
    use buildbidz_app::protocol::UiUpdate;
    use buildbidz_core::access::Route;
    use buildbidz_core::model::Role;

    #[test]
    fn users_table_and_totals() {
        let mut state = signed_in(Role::Admin, Route::Dashboard);
        let stats = serde_json::from_value(serde_json::json!({
            "total_users": 12, "total_jobs": 4, "total_bids": 30, "active_jobs": 3
        }))
        .unwrap();
        apply_ui_update(&mut state, UiUpdate::Dashboard(stats));
        apply_ui_update(
            &mut state,
            UiUpdate::AdminUsers(vec![user("s-1", Role::Supplier)]),
        );
        let text = render_to_text(160, 20, |frame| render(frame, frame.area(), &state));
        assert!(text.contains("Total users: 12"));
        assert!(text.contains("[users] jobs bids (1)"));
        assert!(text.contains("s-1 Infra"));
    }

    #[test]
    fn analytics_pane() {
        let mut state = signed_in(Role::Admin, Route::Dashboard);
        let analytics = serde_json::from_value(serde_json::json!({
            "total_messages": 42,
            "active_conversations": 5
        }))
        .unwrap();
        apply_ui_update(&mut state, UiUpdate::ChatAnalytics(analytics));
        let text = render_to_text(160, 20, |frame| render(frame, frame.area(), &state));
        assert!(text.contains("Total messages:       42"));
    }
}
