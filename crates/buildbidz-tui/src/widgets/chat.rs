// Chat view: conversation list on the left, open conversation on the right.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use buildbidz_core::format::{format_datetime, truncate};
use buildbidz_core::model::{ChatSummary, Message};
use buildbidz_core::upload::format_file_size;

use super::jobs::status_style;
use super::{highlight_style, panel};
use crate::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);
    let (list_area, conversation_area) = (columns[0], columns[1]);

    render_conversations(frame, list_area, state);
    render_messages(frame, conversation_area, state);
}

fn render_conversations(frame: &mut Frame, area: Rect, state: &ViewState) {
    if state.chats.is_empty() {
        frame.render_widget(
            Paragraph::new("No conversations yet. Chat opens once a bid is awarded.")
                .block(panel("Conversations")),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = state.chats.iter().map(conversation_item).collect();
    let list = List::new(items)
        .block(panel(format!("Conversations ({})", state.chats.len())))
        .highlight_style(highlight_style())
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn conversation_item(chat: &ChatSummary) -> ListItem<'static> {
    let mut title = vec![Span::styled(
        truncate(&chat.job_title, 30),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if chat.unread_count > 0 {
        title.push(Span::styled(
            format!(" ({} new)", chat.unread_count),
            Style::default().fg(Color::Red),
        ));
    }
    let other = chat.other_party_name.clone().unwrap_or_default();
    let last = chat
        .last_message
        .as_deref()
        .map(|m| truncate(m, 36))
        .unwrap_or_default();
    ListItem::new(vec![
        Line::from(title),
        Line::from(vec![
            Span::styled(chat.job_status.to_string(), status_style(chat.job_status)),
            Span::raw(format!(" {other}")),
        ]),
        Line::from(Span::styled(last, Style::default().fg(Color::Gray))),
    ])
}

fn render_messages(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(job_id) = &state.open_chat else {
        frame.render_widget(
            Paragraph::new("Select a conversation and press Enter.").block(panel("Messages")),
            area,
        );
        return;
    };

    let title = state
        .chats
        .iter()
        .find(|c| &c.job_id == job_id)
        .map(|c| c.job_title.clone())
        .unwrap_or_else(|| job_id.clone());

    if state.messages.is_empty() {
        frame.render_widget(
            Paragraph::new("No messages yet. Press m to write one.").block(panel(title)),
            area,
        );
        return;
    }

    let own_id = state.user.as_ref().map(|u| u.id.as_str()).unwrap_or_default();
    let items: Vec<ListItem> = state
        .messages
        .iter()
        .enumerate()
        .map(|(i, message)| {
            let attachment = (i == state.message_selected).then_some(state.attachment_selected);
            message_item(message, message.is_from(own_id), attachment)
        })
        .collect();
    let list = List::new(items)
        .block(panel(title))
        .highlight_style(Style::default().bg(Color::Black))
        .highlight_symbol("│ ");
    let mut list_state = ListState::default().with_selected(Some(state.message_selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

/// `highlighted` is the selected attachment when this message is selected.
fn message_item(message: &Message, own: bool, highlighted: Option<usize>) -> ListItem<'static> {
    let sender = if own {
        "You".to_string()
    } else {
        message
            .sender_name
            .clone()
            .unwrap_or_else(|| "Other party".to_string())
    };
    let sender_color = if own { Color::Cyan } else { Color::Yellow };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            sender,
            Style::default().fg(sender_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", format_datetime(message.created_at)),
            Style::default().fg(Color::Gray),
        ),
    ])];
    if !message.message.is_empty() {
        lines.push(Line::from(message.message.clone()));
    }
    for (i, file) in message.file_attachments.iter().enumerate() {
        let style = if highlighted == Some(i) {
            Style::default().fg(Color::Black).bg(Color::White)
        } else {
            Style::default().fg(Color::Magenta)
        };
        lines.push(Line::from(Span::styled(
            format!("  [file] {} ({})", file.filename, format_file_size(file.size)),
            style,
        )));
    }
    lines.push(Line::from(""));
    ListItem::new(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::signed_in;
    use crate::widgets::render_to_text;
    use buildbidz_core::access::Route;
    use buildbidz_core::model::{FileAttachment, Role};

    fn chat_summary() -> ChatSummary {
        serde_json::from_value(serde_json::json!({
            "job_id": "j-1",
            "job_title": "Cement for tower B",
            "job_status": "awarded",
            "other_party_name": "Sharma Traders",
            "last_message": "Dispatching tomorrow",
            "unread_count": 2
        }))
        .unwrap()
    }

    #[test]
    fn lists_conversations_with_unread() {
        let mut state = signed_in(Role::Buyer, Route::Chat);
        state.chats = vec![chat_summary()];
        let text = render_to_text(140, 16, |frame| render(frame, frame.area(), &state));
        assert!(text.contains("Cement for tower B"));
        assert!(text.contains("(2 new)"));
        assert!(text.contains("Select a conversation"));
    }

    #[test]
    fn open_conversation_shows_messages_and_files() {
        let mut state = signed_in(Role::Buyer, Route::Chat);
        state.chats = vec![chat_summary()];
        state.open_chat = Some("j-1".into());
        state.messages = vec![Message {
            id: "m-1".into(),
            job_id: "j-1".into(),
            sender_id: "s-1".into(),
            receiver_id: Some("u-1".into()),
            sender_name: Some("Sharma Traders".into()),
            message: "Invoice attached".into(),
            file_attachments: vec![FileAttachment {
                id: "f-1".into(),
                filename: "invoice.pdf".into(),
                content_type: "application/pdf".into(),
                size: 1536,
                uploaded_at: None,
            }],
            created_at: None,
        }];

        let text = render_to_text(140, 16, |frame| render(frame, frame.area(), &state));
        assert!(text.contains("Invoice attached"));
        assert!(text.contains("[file] invoice.pdf (1.5 KB)"));
    }
}
