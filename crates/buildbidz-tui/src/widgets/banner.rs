// Banner row: the last info/success/warning/error message.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use buildbidz_app::protocol::BannerKind;

use crate::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(banner) = &state.banner else {
        return;
    };
    let (label, color) = kind_style(banner.kind);

    let mut spans = vec![
        Span::styled(
            format!(" {label} "),
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {}", banner.text), Style::default().fg(color)),
    ];
    if let Some(route) = banner.hint {
        spans.push(Span::styled(
            format!("  (see {route})"),
            Style::default().fg(Color::Gray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn kind_style(kind: BannerKind) -> (&'static str, Color) {
    match kind {
        BannerKind::Info => ("INFO", Color::Cyan),
        BannerKind::Success => ("OK", Color::Green),
        BannerKind::Warning => ("WARN", Color::Yellow),
        BannerKind::Error => ("ERROR", Color::Red),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::render_to_text;
    use buildbidz_app::protocol::Banner;
    use buildbidz_core::access::Route;

    #[test]
    fn payment_hint_is_shown() {
        let mut state = ViewState::default();
        state.banner = Some(
            Banner::error("Failed to create job: Active subscription required")
                .with_hint(Route::Subscription),
        );
        let text = render_to_text(120, 1, |frame| render(frame, frame.area(), &state));
        assert!(text.contains("ERROR"));
        assert!(text.contains("Active subscription required"));
        assert!(text.contains("(see Subscription)"));
    }

    #[test]
    fn empty_without_banner() {
        let state = ViewState::default();
        let text = render_to_text(20, 1, |frame| render(frame, frame.area(), &state));
        assert_eq!(text.trim(), "");
    }
}
