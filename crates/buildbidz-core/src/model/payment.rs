// Subscription orders and gateway confirmations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// Order created by `POST /payments/create-subscription-order`.
/// `amount` is in the smallest currency unit (paise).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubscriptionOrder {
    #[serde(alias = "order_id")]
    pub id: String,
    pub amount: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "INR".to_string()
}

impl SubscriptionOrder {
    /// Amount in whole rupees for display.
    pub fn amount_major(&self) -> f64 {
        self.amount as f64 / 100.0
    }
}

/// The gateway's confirmation triple, forwarded as form fields to
/// `POST /payments/verify-subscription`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentConfirmation {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Response of a successful verification.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionActivated {
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "subscription_expires_at", with = "timestamp::option")]
    pub expires_at: Option<DateTime<Utc>>,
}
