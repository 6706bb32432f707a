// Typed errors for the REST client.

pub use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::subscription::SUBSCRIPTION_REQUIRED;

/// Fallback shown when the server gives no usable `detail`.
pub const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("not signed in")]
    NotAuthenticated,

    #[error("{detail}")]
    Status { status: StatusCode, detail: String },

    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },

    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Invalid(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// True when the session token is missing, expired or rejected.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::NotAuthenticated) || self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_payment_required(&self) -> bool {
        self.status() == Some(StatusCode::PAYMENT_REQUIRED)
    }

    /// The user-facing part of the error, as shown after "Failed to <action>: ".
    pub fn detail(&self) -> String {
        match self {
            ApiError::Status { status, detail } if *status == StatusCode::PAYMENT_REQUIRED => {
                if detail == UNKNOWN_ERROR {
                    SUBSCRIPTION_REQUIRED.to_string()
                } else {
                    detail.clone()
                }
            }
            ApiError::Status { detail, .. } => detail.clone(),
            ApiError::Invalid(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Pull the message out of an error body.
///
/// The backend sends `{"detail": "text"}` for handled errors and
/// `{"detail": [{"msg": "..."}, ...]}` for request validation failures.
pub fn extract_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return UNKNOWN_ERROR.to_string();
    };
    match value.get("detail") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Array(items)) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if msgs.is_empty() {
                UNKNOWN_ERROR.to_string()
            } else {
                msgs.join("; ")
            }
        }
        _ => UNKNOWN_ERROR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string() {
        assert_eq!(extract_detail(r#"{"detail":"Job not found"}"#), "Job not found");
    }

    #[test]
    fn detail_validation_list() {
        let body = r#"{"detail":[{"loc":["body","price_quote"],"msg":"field required"},{"msg":"value is not a valid email"}]}"#;
        assert_eq!(
            extract_detail(body),
            "field required; value is not a valid email"
        );
    }

    #[test]
    fn detail_missing_or_not_json() {
        assert_eq!(extract_detail("{}"), UNKNOWN_ERROR);
        assert_eq!(extract_detail("<html>502</html>"), UNKNOWN_ERROR);
        assert_eq!(extract_detail(r#"{"detail":""}"#), UNKNOWN_ERROR);
    }

    #[test]
    fn status_helpers() {
        let err = ApiError::Status {
            status: StatusCode::UNAUTHORIZED,
            detail: "Could not validate credentials".into(),
        };
        assert!(err.is_unauthorized());
        assert!(!err.is_payment_required());
        assert_eq!(err.detail(), "Could not validate credentials");
        assert!(ApiError::NotAuthenticated.is_unauthorized());
    }

    #[test]
    fn payment_required_without_detail_gets_subscription_message() {
        let err = ApiError::Status {
            status: StatusCode::PAYMENT_REQUIRED,
            detail: UNKNOWN_ERROR.into(),
        };
        assert!(err.is_payment_required());
        assert_eq!(err.detail(), "Active subscription required");
    }
}
