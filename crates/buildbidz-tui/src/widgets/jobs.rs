// Jobs view: browse open jobs or the buyer's own, with a detail pane.
//
// Table: Title, Category, Location, Status, Posted
// Filtered by `filter_text` and `category_filter` from ViewState

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;

use buildbidz_core::access::JobsTab;
use buildbidz_core::format::{format_date, truncate};
use buildbidz_core::model::{Job, JobStatus};

use super::{header_style, highlight_style, panel};
use crate::layout::split_main;
use crate::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (list_area, detail_area) = split_main(area);
    let jobs = state.visible_jobs();

    let header = Row::new(vec![
        Cell::from("Title"),
        Cell::from("Category"),
        Cell::from("Location"),
        Cell::from("Status"),
        Cell::from("Posted"),
    ])
    .style(header_style());

    let rows: Vec<Row> = jobs
        .iter()
        .map(|job| {
            Row::new(vec![
                Cell::from(truncate(&job.title, 32)),
                Cell::from(job.category.to_string()),
                Cell::from(truncate(&job.location, 16)),
                Cell::from(Span::styled(job.status.to_string(), status_style(job.status))),
                Cell::from(format_date(job.created_at)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(16),
        Constraint::Length(10),
        Constraint::Length(16),
        Constraint::Length(8),
        Constraint::Length(11),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(build_title(state, jobs.len())))
        .row_highlight_style(highlight_style())
        .highlight_symbol(">> ");

    let mut table_state = TableState::default().with_selected((!jobs.is_empty()).then_some(state.selected));
    frame.render_stateful_widget(table, list_area, &mut table_state);

    render_detail(frame, detail_area, jobs.get(state.selected).copied());
}

pub fn status_style(status: JobStatus) -> Style {
    match status {
        JobStatus::Open => Style::default().fg(Color::Green),
        JobStatus::Awarded => Style::default().fg(Color::Yellow),
        JobStatus::Closed => Style::default().fg(Color::Gray),
    }
}

fn build_title(state: &ViewState, count: usize) -> String {
    let mut title = match state.jobs_tab {
        JobsTab::Browse => String::from("Open jobs"),
        JobsTab::Mine => String::from("My jobs"),
    };
    if let Some(category) = state.category_filter {
        title.push_str(&format!(" [{category}]"));
    }
    if !state.filter_text.is_empty() || state.filter_mode {
        let cursor = if state.filter_mode { "_" } else { "" };
        title.push_str(&format!(" \"{}{cursor}\"", state.filter_text));
    }
    title.push_str(&format!(" ({count})"));
    title
}

fn render_detail(frame: &mut Frame, area: Rect, job: Option<&Job>) {
    let Some(job) = job else {
        frame.render_widget(
            Paragraph::new("No jobs to show.").block(panel("Details")),
            area,
        );
        return;
    };

    let field = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)),
            Span::raw(value),
        ])
    };
    let mut lines = vec![
        field("Category", job.category.to_string()),
        field("Location", job.location.clone()),
        field("Delivery", job.delivery_timeline.clone()),
    ];
    if let Some(quantity) = &job.quantity {
        lines.push(field("Quantity", quantity.clone()));
    }
    if let Some(budget) = &job.budget_range {
        lines.push(field("Budget", budget.clone()));
    }
    lines.push(field("Status", job.status.to_string()));
    if !job.file_urls.is_empty() {
        lines.push(field("Files", job.file_urls.len().to_string()));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(job.description.clone()));

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(panel(truncate(&job.title, 40))),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{job, signed_in};
    use crate::widgets::render_to_text;
    use buildbidz_core::access::Route;
    use buildbidz_core::model::{JobCategory, Role};

    #[test]
    fn lists_jobs_and_selected_detail() {
        let mut state = signed_in(Role::Supplier, Route::Jobs);
        let mut excavator = job("j-2", "b-1", JobStatus::Open);
        excavator.title = "Excavator hire".into();
        excavator.category = JobCategory::Machinery;
        excavator.budget_range = Some("₹2-3 lakh".into());
        state.open_jobs = vec![job("j-1", "b-1", JobStatus::Open), excavator];
        state.selected = 1;

        let text = render_to_text(140, 20, |frame| render(frame, frame.area(), &state));
        assert!(text.contains("Open jobs (2)"));
        assert!(text.contains("Excavator hire"));
        assert!(text.contains("Budget: ₹2-3 lakh"));
    }

    #[test]
    fn title_shows_filters() {
        let mut state = signed_in(Role::Buyer, Route::Jobs);
        state.category_filter = Some(JobCategory::Labor);
        state.filter_text = "pune".into();
        assert_eq!(build_title(&state, 0), "My jobs [Labor] \"pune\" (0)");
    }

    #[test]
    fn empty_list_renders() {
        let state = signed_in(Role::Supplier, Route::Jobs);
        let text = render_to_text(100, 12, |frame| render(frame, frame.area(), &state));
        assert!(text.contains("No jobs to show."));
    }
}
