// Bids view: bids received on the buyer's jobs, or the bidder's own bids.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;

use buildbidz_core::access::BidsTab;
use buildbidz_core::format::{format_date, format_price, truncate};
use buildbidz_core::model::{Bid, BidStatus};

use super::jobs::status_style;
use super::{header_style, highlight_style, panel};
use crate::layout::split_main;
use crate::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    if state.picking_job_for_bids() {
        render_job_picker(frame, area, state);
        return;
    }

    let (list_area, detail_area) = split_main(area);
    let bids = state.visible_bids();

    let (title, header, rows): (String, Row, Vec<Row>) = match state.bids_tab {
        BidsTab::Received => {
            let job_title = state
                .received_job()
                .map(|j| j.title.clone())
                .or_else(|| state.received_bids.as_ref().map(|(id, _)| id.clone()))
                .unwrap_or_default();
            let header = Row::new(vec!["Bidder", "Price", "Delivery", "Status", "Submitted"]);
            let rows = bids
                .iter()
                .map(|bid| {
                    Row::new(vec![
                        Cell::from(truncate(bid.bidder_name(), 28)),
                        Cell::from(format_price(bid.price_quote)),
                        Cell::from(truncate(&bid.delivery_estimate, 16)),
                        Cell::from(Span::styled(bid.status.to_string(), bid_style(bid.status))),
                        Cell::from(format_date(bid.created_at)),
                    ])
                })
                .collect();
            (
                format!("Bids on {} ({})", truncate(&job_title, 40), bids.len()),
                header,
                rows,
            )
        }
        BidsTab::Mine => {
            let header = Row::new(vec!["Job", "Category", "Price", "Delivery", "Status"]);
            let rows = bids
                .iter()
                .map(|bid| {
                    let (job, category) = bid
                        .job_info
                        .as_ref()
                        .map(|j| (j.title.clone(), j.category.to_string()))
                        .unwrap_or_else(|| (bid.job_id.clone(), String::new()));
                    Row::new(vec![
                        Cell::from(truncate(&job, 28)),
                        Cell::from(category),
                        Cell::from(format_price(bid.price_quote)),
                        Cell::from(truncate(&bid.delivery_estimate, 16)),
                        Cell::from(Span::styled(bid.status.to_string(), bid_style(bid.status))),
                    ])
                })
                .collect();
            (format!("My bids ({})", bids.len()), header, rows)
        }
    };

    let widths = [
        Constraint::Min(16),
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(10),
        Constraint::Length(11),
    ];
    let table = Table::new(rows, widths)
        .header(header.style(header_style()))
        .block(panel(title))
        .row_highlight_style(highlight_style())
        .highlight_symbol(">> ");
    let mut table_state =
        TableState::default().with_selected((!bids.is_empty()).then_some(state.selected));
    frame.render_stateful_widget(table, list_area, &mut table_state);

    render_detail(frame, detail_area, bids.get(state.selected));
}

fn render_job_picker(frame: &mut Frame, area: Rect, state: &ViewState) {
    let rows: Vec<Row> = state
        .my_jobs
        .iter()
        .map(|job| {
            Row::new(vec![
                Cell::from(truncate(&job.title, 40)),
                Cell::from(job.category.to_string()),
                Cell::from(Span::styled(job.status.to_string(), status_style(job.status))),
                Cell::from(format_date(job.created_at)),
            ])
        })
        .collect();
    let widths = [
        Constraint::Min(20),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(11),
    ];
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Job", "Category", "Status", "Posted"]).style(header_style()))
        .block(panel("Select a job to view its bids"))
        .row_highlight_style(highlight_style())
        .highlight_symbol(">> ");
    let mut table_state = TableState::default()
        .with_selected((!state.my_jobs.is_empty()).then_some(state.selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}

pub fn bid_style(status: BidStatus) -> Style {
    match status {
        BidStatus::Submitted => Style::default().fg(Color::Cyan),
        BidStatus::Awarded => Style::default().fg(Color::Green),
        BidStatus::Rejected => Style::default().fg(Color::Red),
    }
}

fn render_detail(frame: &mut Frame, area: Rect, bid: Option<&Bid>) {
    let Some(bid) = bid else {
        frame.render_widget(Paragraph::new("No bids yet.").block(panel("Details")), area);
        return;
    };

    let field = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)),
            Span::raw(value),
        ])
    };
    let mut lines = vec![
        field("Price", format_price(bid.price_quote)),
        field("Delivery", bid.delivery_estimate.clone()),
        field("Status", bid.status.to_string()),
    ];
    if let Some(info) = &bid.supplier_info {
        if !info.contact_phone.is_empty() {
            lines.push(field("Phone", info.contact_phone.clone()));
        }
    }
    if bid.is_salesman_bid() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Placed by a salesman for:",
            Style::default().fg(Color::Yellow),
        )));
        for (label, value) in [
            ("Company", &bid.company_name),
            ("Phone", &bid.company_contact_phone),
            ("Email", &bid.company_email),
            ("GST", &bid.company_gst_number),
            ("Address", &bid.company_address),
        ] {
            if let Some(value) = value {
                lines.push(field(label, value.clone()));
            }
        }
    }
    if let Some(notes) = &bid.notes {
        lines.push(Line::from(""));
        lines.push(Line::from(notes.clone()));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(panel(truncate(bid.bidder_name(), 40))),
        area,
    );
}
