// Settings: the signed-in user's profile.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use buildbidz_core::format::format_date;

use super::panel;
use crate::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(user) = &state.user else {
        return;
    };
    let field = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<14}"), Style::default().fg(Color::Gray)),
            Span::raw(value),
        ])
    };
    let or_dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let lines = vec![
        field("Company", user.company_name.clone()),
        field("Email", user.email.clone()),
        field("Phone", user.contact_phone.clone()),
        field("Role", user.role.to_string()),
        field("GST number", or_dash(&user.gst_number)),
        field("Address", or_dash(&user.address)),
        field(
            "Verified",
            if user.is_verified { "yes" } else { "no" }.to_string(),
        ),
        field("Member since", format_date(user.created_at)),
        Line::from(""),
        Line::from(Span::styled(
            "e: edit profile   w: change password",
            Style::default().fg(Color::Yellow),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).block(panel("Settings")), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::signed_in;
    use crate::widgets::render_to_text;
    use buildbidz_core::access::Route;
    use buildbidz_core::model::Role;

    #[test]
    fn shows_profile_fields() {
        let state = signed_in(Role::Supplier, Route::Settings);
        let text = render_to_text(80, 16, |frame| render(frame, frame.area(), &state));
        assert!(text.contains("u-1@acme.in"));
        assert!(text.contains("GST number    -"));
    }
}
