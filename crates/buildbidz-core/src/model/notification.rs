// In-app notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BidAwarded,
    BidRejected,
    NewBid,
    NewMessage,
    #[serde(other)]
    Other,
}

impl NotificationKind {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationKind::BidAwarded => "Bid awarded",
            NotificationKind::BidRejected => "Bid rejected",
            NotificationKind::NewBid => "New bid",
            NotificationKind::NewMessage => "New message",
            NotificationKind::Other => "Notice",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response of `GET /notifications/unread-count`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UnreadCount {
    pub unread_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_kind_maps_to_other() {
        let n: Notification = serde_json::from_value(json!({
            "id": "n-1",
            "type": "subscription_reminder",
            "title": "Renew",
            "message": "Your plan ends soon"
        }))
        .unwrap();
        assert_eq!(n.kind, NotificationKind::Other);
        assert!(!n.is_read);
    }

    #[test]
    fn known_kinds_decode() {
        let n: Notification = serde_json::from_value(json!({
            "id": "n-2",
            "type": "bid_awarded",
            "title": "Congratulations",
            "message": "You won",
            "job_id": "j-9",
            "is_read": true
        }))
        .unwrap();
        assert_eq!(n.kind, NotificationKind::BidAwarded);
        assert_eq!(n.job_id.as_deref(), Some("j-9"));
    }
}
