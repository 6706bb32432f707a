// Notification endpoints.

use reqwest::Method;

use super::ApiClient;
use crate::error::ApiError;
use crate::model::{Notification, UnreadCount};

impl ApiClient {
    pub async fn notifications(&self) -> Result<Vec<Notification>, ApiError> {
        let builder = self.authed(Method::GET, "notifications")?;
        self.send_json("notifications", builder).await
    }

    pub async fn unread_notification_count(&self) -> Result<u32, ApiError> {
        let builder = self.authed(Method::GET, "notifications/unread-count")?;
        let count: UnreadCount = self.send_json("notifications/unread-count", builder).await?;
        Ok(count.unread_count)
    }
}
