// Marketplace records as the backend serves them.

pub mod admin;
pub mod bid;
pub mod chat;
pub mod job;
pub mod notification;
pub mod payment;
pub mod stats;
pub mod user;

pub use admin::{ChatAnalytics, MessageDistribution, UserDetails};
pub use bid::{Bid, BidJobInfo, BidStatus, NewBid, SalesmanBid, SupplierInfo};
pub use chat::{ChatSummary, FileAttachment, Message, SendWithFilesResponse, UploadResponse};
pub use job::{Job, JobCategory, JobStatus, NewJob};
pub use notification::{Notification, NotificationKind, UnreadCount};
pub use payment::{PaymentConfirmation, SubscriptionOrder, SubscriptionActivated};
pub use stats::DashboardStats;
pub use user::{
    AuthResponse, ChangePassword, LoginRequest, ProfileUpdate, RegisterRequest, ResetPassword,
    Role, SubscriptionStatus, User,
};

/// Serde helpers for backend timestamps.
///
/// The backend emits either RFC 3339 (`2025-03-01T10:00:00Z`) or a naive
/// ISO-8601 string in UTC (`2025-03-01T10:00:00.123456`). Both decode to
/// `DateTime<Utc>`; encoding always produces RFC 3339.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{raw}`")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => s.serialize_str(&dt.to_rfc3339()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw: Option<String> = Option::deserialize(d)?;
            match raw {
                None => Ok(None),
                Some(s) if s.is_empty() => Ok(None),
                Some(s) => super::parse(&s)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{s}`"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::timestamp;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_rfc3339() {
        let dt = timestamp::parse("2025-03-01T10:15:00Z").unwrap();
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.minute(), 15);
    }

    #[test]
    fn parses_naive_python_isoformat() {
        let dt = timestamp::parse("2025-03-01T10:15:00.123456").unwrap();
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn parses_offset_and_normalizes_to_utc() {
        let dt = timestamp::parse("2025-03-01T15:45:00+05:30").unwrap();
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.minute(), 15);
    }

    #[test]
    fn rejects_garbage() {
        assert!(timestamp::parse("yesterday").is_none());
    }
}
