// Conversations, messages and file attachments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::job::JobStatus;
use super::timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAttachment {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, with = "timestamp::option")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub job_id: String,
    pub sender_id: String,
    #[serde(default)]
    pub receiver_id: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub file_attachments: Vec<FileAttachment>,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn is_from(&self, user_id: &str) -> bool {
        self.sender_id == user_id
    }
}

/// One row of the conversation list (`GET /chats`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub job_id: String,
    #[serde(default)]
    pub job_title: String,
    pub job_status: JobStatus,
    #[serde(default)]
    pub other_party_name: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message_count: u32,
    #[serde(default)]
    pub unread_count: u32,
}

/// Response of `POST /jobs/{id}/chat/with-files`.
#[derive(Debug, Clone, Deserialize)]
pub struct SendWithFilesResponse {
    pub chat_message: Message,
    #[serde(default)]
    pub files_uploaded: u32,
}

/// Response of `POST /upload/{type}/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub files: Vec<FileAttachment>,
}
