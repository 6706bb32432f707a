// Admin-only views: user details and chat analytics.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::bid::Bid;
use super::job::Job;
use super::timestamp;
use super::user::User;

/// `GET /admin/users/{id}/details`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDetails {
    pub user: User,
    #[serde(default)]
    pub jobs_posted: u64,
    #[serde(default)]
    pub bids_submitted: u64,
    #[serde(default)]
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub bids: Vec<Bid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct MessageDistribution {
    #[serde(default)]
    pub last_24_hours: u64,
    #[serde(default)]
    pub last_week: u64,
    #[serde(default)]
    pub last_month: u64,
    #[serde(default)]
    pub older_than_month: u64,
}

/// `GET /admin/chat-analytics`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatAnalytics {
    pub total_messages: u64,
    pub active_conversations: u64,
    #[serde(default)]
    pub message_distribution: MessageDistribution,
    #[serde(default, with = "timestamp::option")]
    pub oldest_message_date: Option<DateTime<Utc>>,
}
