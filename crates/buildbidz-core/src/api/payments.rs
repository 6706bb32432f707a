// Subscription payment endpoints. The client never talks to the gateway.

use reqwest::Method;

use super::ApiClient;
use crate::error::ApiError;
use crate::model::{PaymentConfirmation, SubscriptionActivated, SubscriptionOrder};

impl ApiClient {
    pub async fn create_subscription_order(&self) -> Result<SubscriptionOrder, ApiError> {
        let path = "payments/create-subscription-order";
        let builder = self.authed(Method::POST, path)?;
        self.send_json(path, builder).await
    }

    /// Forward the gateway's confirmation triple as form fields.
    pub async fn verify_subscription(
        &self,
        confirmation: &PaymentConfirmation,
    ) -> Result<SubscriptionActivated, ApiError> {
        let path = "payments/verify-subscription";
        let builder = self.authed(Method::POST, path)?.form(confirmation);
        self.send_json(path, builder).await
    }
}
