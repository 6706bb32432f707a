// Landing, sign-in and About pages.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use buildbidz_core::access::Route;

use super::panel;
use crate::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let title = if state.route == Route::Auth {
        "Sign in"
    } else {
        "Welcome"
    };
    let key = |k: &'static str| {
        Span::styled(
            k,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "BuildBidz",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from("Construction procurement, bid by bid."),
        Line::from(""),
        Line::from("Buyers post material, labor and machinery requirements."),
        Line::from("Suppliers compete with quotes. The buyer awards one bid"),
        Line::from("and the two parties continue in a private chat."),
        Line::from(""),
        Line::from(vec![key("l"), Span::raw(" sign in    "), key("r"), Span::raw(" create an account")]),
        Line::from(vec![
            key("f"),
            Span::raw(" forgot password    "),
            key("p"),
            Span::raw(" enter a reset code"),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(panel(title));
    frame.render_widget(paragraph, area);
}

pub fn render_about(frame: &mut Frame, area: Rect) {
    let text = "BuildBidz connects construction companies with the contractors and \
        vendors who supply them.\n\n\
        Buyers post jobs with a category, quantity, location and delivery timeline, \
        and can attach drawings or specifications. Suppliers bid with a price quote \
        and a delivery estimate. Salesmen bid on behalf of companies that are not yet \
        registered.\n\n\
        Once the buyer awards a bid, every other bid on the job is rejected and a chat \
        opens between the buyer and the winning bidder.\n\n\
        Buyers start with a free trial; posting jobs afterwards needs an active \
        subscription.";
    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(panel("About"));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::render_to_text;

    #[test]
    fn landing_lists_entry_keys() {
        let state = ViewState::default();
        let text = render_to_text(80, 16, |frame| render(frame, frame.area(), &state));
        assert!(text.contains("Welcome"));
        assert!(text.contains("create an account"));
    }

    #[test]
    fn about_renders() {
        let text = render_to_text(80, 20, |frame| render_about(frame, frame.area()));
        assert!(text.contains("About"));
    }
}
