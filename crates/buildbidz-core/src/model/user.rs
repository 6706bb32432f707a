// Accounts, roles, and the auth request/response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::timestamp;

/// Marketplace role. Decides which dashboard, tabs and actions a user gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Supplier,
    Admin,
    Salesman,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Supplier => "supplier",
            Role::Admin => "admin",
            Role::Salesman => "salesman",
        }
    }

    /// Parse the wire/CLI spelling. Case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "buyer" => Some(Role::Buyer),
            "supplier" => Some(Role::Supplier),
            "admin" => Some(Role::Admin),
            "salesman" => Some(Role::Salesman),
            _ => None,
        }
    }

    /// Roles a visitor may pick on the registration form.
    pub fn self_service() -> &'static [Role] {
        &[Role::Buyer, Role::Supplier]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Buyer => "Buyer",
            Role::Supplier => "Supplier",
            Role::Admin => "Admin",
            Role::Salesman => "Salesman",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    #[default]
    Inactive,
    Expired,
}

impl SubscriptionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SubscriptionStatus::Trial => "Free Trial",
            SubscriptionStatus::Active => "Active",
            SubscriptionStatus::Inactive => "Inactive",
            SubscriptionStatus::Expired => "Expired",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub company_name: String,
    #[serde(default)]
    pub contact_phone: String,
    pub role: Role,
    #[serde(default)]
    pub gst_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub subscription_status: SubscriptionStatus,
    #[serde(default, with = "timestamp::option")]
    pub subscription_expires_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub trial_expires_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Merge a successful profile update into the cached user, the way the
    /// settings page refreshes its context without refetching.
    pub fn apply_profile(&mut self, update: &ProfileUpdate) {
        self.company_name = update.company_name.clone();
        self.contact_phone = update.contact_phone.clone();
        self.gst_number = update.gst_number.clone().filter(|s| !s.is_empty());
        self.address = update.address.clone().filter(|s| !s.is_empty());
    }
}

/// Body for `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body for `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub company_name: String,
    pub contact_phone: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Response of both login and register.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Body for `PUT /profile`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub company_name: String,
    pub contact_phone: String,
    pub gst_number: Option<String>,
    pub address: Option<String>,
}

impl ProfileUpdate {
    pub fn from_user(user: &User) -> Self {
        ProfileUpdate {
            company_name: user.company_name.clone(),
            contact_phone: user.contact_phone.clone(),
            gst_number: user.gst_number.clone(),
            address: user.address.clone(),
        }
    }
}

/// Body for `POST /auth/change-password`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
}

/// Body for `POST /auth/reset-password`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResetPassword {
    pub email: String,
    pub reset_code: String,
    pub new_password: String,
}
