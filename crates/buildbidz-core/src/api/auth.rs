// Account endpoints: register, login, profile, passwords, dashboard stats.

use reqwest::Method;
use serde_json::json;
use tracing::info;

use super::{Ack, ApiClient};
use crate::error::ApiError;
use crate::model::{
    AuthResponse, ChangePassword, DashboardStats, LoginRequest, ProfileUpdate, RegisterRequest,
    ResetPassword, User,
};

impl ApiClient {
    /// Register and adopt the returned token.
    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let builder = self.request(Method::POST, "auth/register").json(req);
        let resp: AuthResponse = self.send_json("auth/register", builder).await?;
        self.set_token(Some(resp.access_token.clone()));
        info!(role = resp.user.role.as_str(), "registered");
        Ok(resp)
    }

    /// Log in and adopt the returned token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let builder = self.request(Method::POST, "auth/login").json(&body);
        let resp: AuthResponse = self.send_json("auth/login", builder).await?;
        self.set_token(Some(resp.access_token.clone()));
        info!(role = resp.user.role.as_str(), "logged in");
        Ok(resp)
    }

    pub async fn profile(&self) -> Result<User, ApiError> {
        let builder = self.authed(Method::GET, "profile")?;
        self.send_json("profile", builder).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let builder = self.authed(Method::PUT, "profile")?.json(update);
        self.send_json("profile", builder).await
    }

    pub async fn change_password(&self, req: &ChangePassword) -> Result<String, ApiError> {
        let builder = self.authed(Method::POST, "auth/change-password")?.json(req);
        let ack: Ack = self.send_json("auth/change-password", builder).await?;
        Ok(ack.message)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<String, ApiError> {
        let builder = self
            .request(Method::POST, "auth/forgot-password")
            .json(&json!({ "email": email }));
        let ack: Ack = self.send_json("auth/forgot-password", builder).await?;
        Ok(ack.message)
    }

    pub async fn reset_password(&self, req: &ResetPassword) -> Result<String, ApiError> {
        let builder = self.request(Method::POST, "auth/reset-password").json(req);
        let ack: Ack = self.send_json("auth/reset-password", builder).await?;
        Ok(ack.message)
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let builder = self.authed(Method::GET, "dashboard/stats")?;
        self.send_json("dashboard/stats", builder).await
    }
}
