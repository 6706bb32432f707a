// Chat endpoints.

use std::path::PathBuf;

use reqwest::multipart::Form;
use reqwest::Method;
use serde_json::json;

use super::files::file_part;
use super::ApiClient;
use crate::error::ApiError;
use crate::model::{ChatSummary, Message, SendWithFilesResponse};

impl ApiClient {
    pub async fn chats(&self) -> Result<Vec<ChatSummary>, ApiError> {
        let builder = self.authed(Method::GET, "chats")?;
        self.send_json("chats", builder).await
    }

    pub async fn messages(&self, job_id: &str) -> Result<Vec<Message>, ApiError> {
        let path = format!("jobs/{job_id}/chat");
        let builder = self.authed(Method::GET, &path)?;
        self.send_json(&path, builder).await
    }

    pub async fn send_message(&self, job_id: &str, text: &str) -> Result<Message, ApiError> {
        let path = format!("jobs/{job_id}/chat");
        let builder = self
            .authed(Method::POST, &path)?
            .json(&json!({ "message": text }));
        self.send_json(&path, builder).await
    }

    /// Send text plus attachments in one multipart request.
    pub async fn send_message_with_files(
        &self,
        job_id: &str,
        text: &str,
        files: &[PathBuf],
    ) -> Result<SendWithFilesResponse, ApiError> {
        let path = format!("jobs/{job_id}/chat/with-files");
        let mut form = Form::new().text("message", text.to_string());
        for file in files {
            form = form.part("files", file_part(file).await?);
        }
        let builder = self.authed(Method::POST, &path)?.multipart(form);
        self.send_json(&path, builder).await
    }

    pub async fn mark_chat_read(&self, job_id: &str) -> Result<(), ApiError> {
        let path = format!("chats/{job_id}/mark-read");
        let builder = self.authed(Method::POST, &path)?;
        self.send_unit(&path, builder).await
    }

    pub async fn delete_message(&self, message_id: &str) -> Result<(), ApiError> {
        let path = format!("messages/{message_id}");
        let builder = self.authed(Method::DELETE, &path)?;
        self.send_unit(&path, builder).await
    }
}
