// Notifications overlay drawn over the main panel.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, List, ListItem, Paragraph};
use ratatui::Frame;

use buildbidz_core::format::format_datetime;
use buildbidz_core::model::Notification;

use super::confirm::centered_rect;
use super::panel;
use crate::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let width = area.width.saturating_sub(8).max(40);
    let height = area.height.saturating_sub(2).max(6);
    let overlay = centered_rect(width, height, area);
    frame.render_widget(Clear, overlay);

    let title = format!("Notifications ({} unread)", state.unread_notifications);
    if state.notifications.is_empty() {
        frame.render_widget(Paragraph::new("No notifications.").block(panel(title)), overlay);
        return;
    }

    let items: Vec<ListItem> = state.notifications.iter().map(notification_item).collect();
    frame.render_widget(List::new(items).block(panel(title)), overlay);
}

fn notification_item(n: &Notification) -> ListItem<'static> {
    let marker = if n.is_read { "  " } else { "● " };
    let title_style = if n.is_read {
        Style::default()
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    ListItem::new(vec![
        Line::from(vec![
            Span::styled(marker, Style::default().fg(Color::Red)),
            Span::styled(format!("[{}] ", n.kind.label()), Style::default().fg(Color::Cyan)),
            Span::styled(n.title.clone(), title_style),
            Span::styled(
                format!("  {}", format_datetime(n.created_at)),
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(format!("  {}", n.message)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply_ui_update;
    use crate::test_support::signed_in;
    use crate::widgets::render_to_text;
    use buildbidz_app::protocol::UiUpdate;
    use buildbidz_core::access::Route;
    use buildbidz_core::model::Role;

    #[test]
    fn lists_notifications_with_kind() {
        let mut state = signed_in(Role::Supplier, Route::Dashboard);
        let list = serde_json::from_value(serde_json::json!([{
            "id": "n-1",
            "type": "bid_awarded",
            "title": "Your bid was awarded",
            "message": "Cement for tower B",
            "is_read": false,
            "created_at": "2025-03-01T10:00:00Z"
        }]))
        .unwrap();
        apply_ui_update(&mut state, UiUpdate::Notifications(list));
        apply_ui_update(&mut state, UiUpdate::UnreadNotifications(1));
        let text = render_to_text(100, 12, |frame| render(frame, frame.area(), &state));
        assert!(text.contains("Notifications (1 unread)"));
        assert!(text.contains("[Bid awarded] Your bid was awarded"));
    }
}
