// Admin endpoints.

use std::fmt;

use reqwest::Method;

use super::ApiClient;
use crate::error::ApiError;
use crate::model::{Bid, ChatAnalytics, Job, User, UserDetails};

/// Admin-managed collection; the `{type}` segment of `DELETE /admin/{type}/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminTable {
    Users,
    Jobs,
    Bids,
}

impl AdminTable {
    pub const ALL: [AdminTable; 3] = [AdminTable::Users, AdminTable::Jobs, AdminTable::Bids];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminTable::Users => "users",
            AdminTable::Jobs => "jobs",
            AdminTable::Bids => "bids",
        }
    }
}

impl fmt::Display for AdminTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ApiClient {
    pub async fn admin_users(&self) -> Result<Vec<User>, ApiError> {
        let builder = self.authed(Method::GET, "admin/users")?;
        self.send_json("admin/users", builder).await
    }

    pub async fn admin_jobs(&self) -> Result<Vec<Job>, ApiError> {
        let builder = self.authed(Method::GET, "admin/jobs")?;
        self.send_json("admin/jobs", builder).await
    }

    pub async fn admin_bids(&self) -> Result<Vec<Bid>, ApiError> {
        let builder = self.authed(Method::GET, "admin/bids")?;
        self.send_json("admin/bids", builder).await
    }

    pub async fn admin_delete(&self, table: AdminTable, id: &str) -> Result<(), ApiError> {
        let path = format!("admin/{table}/{id}");
        let builder = self.authed(Method::DELETE, &path)?;
        self.send_unit(&path, builder).await
    }

    pub async fn admin_user_details(&self, user_id: &str) -> Result<UserDetails, ApiError> {
        let path = format!("admin/users/{user_id}/details");
        let builder = self.authed(Method::GET, &path)?;
        self.send_json(&path, builder).await
    }

    pub async fn chat_analytics(&self) -> Result<ChatAnalytics, ApiError> {
        let builder = self.authed(Method::GET, "admin/chat-analytics")?;
        self.send_json("admin/chat-analytics", builder).await
    }
}
