// Subscription page: buyer plan status, order creation and payment
// confirmation.

use chrono::Utc;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use buildbidz_core::format::format_price;
use buildbidz_core::subscription;

use super::panel;
use crate::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(user) = &state.user else {
        return;
    };
    let now = Utc::now();

    let mut lines = vec![
        Line::from(Span::styled(
            subscription::describe(user, now),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Status: {}", user.subscription_status.label())),
        Line::from(""),
    ];

    match &state.subscription_order {
        Some(order) => {
            lines.push(Line::from(Span::styled(
                "Order created",
                Style::default().fg(Color::Green),
            )));
            lines.push(Line::from(format!("Order id: {}", order.id)));
            let amount = if order.currency.eq_ignore_ascii_case("INR") {
                format_price(order.amount_major())
            } else {
                format!("{:.2} {}", order.amount_major(), order.currency)
            };
            lines.push(Line::from(format!("Amount:   {amount}")));
            lines.push(Line::from(""));
            lines.push(Line::from(
                "Complete the payment with the gateway, then press v and enter the \
                 payment id and signature it returns.",
            ));
        }
        None => {
            lines.push(Line::from(
                "Press s to create a subscription order. Payment happens with the \
                 gateway outside this client; press v afterwards to confirm it.",
            ));
        }
    }

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(panel("Subscription")),
        area,
    );
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
    fn order_details_are_shown() {
        let mut state = signed_in(Role::Buyer, Route::Subscription);
        let order = serde_json::from_value(serde_json::json!({
            "id": "order_9", "amount": 99900, "currency": "INR"
        }))
        .unwrap();
        apply_ui_update(&mut state, UiUpdate::SubscriptionOrder(order));
        let text = render_to_text(100, 14, |frame| render(frame, frame.area(), &state));
        assert!(text.contains("Order id: order_9"));
        assert!(text.contains("₹999"));
    }

    #[test]
    fn without_order_explains_next_step() {
        let state = signed_in(Role::Buyer, Route::Subscription);
        let text = render_to_text(100, 14, |frame| render(frame, frame.area(), &state));
        assert!(text.contains("Subscribe to post jobs"));
        assert!(text.contains("Press s"));
    }
}
