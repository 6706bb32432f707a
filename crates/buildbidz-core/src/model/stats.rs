// Role-specific dashboard statistics.

use serde::{Deserialize, Deserializer};

use super::user::SubscriptionStatus;

/// `GET /dashboard/stats`. The backend returns a different shape per role;
/// variants are tried in order so the most specific match wins.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DashboardStats {
    Admin {
        total_users: u64,
        total_jobs: u64,
        total_bids: u64,
        active_jobs: u64,
    },
    Buyer {
        total_jobs: u64,
        active_jobs: u64,
        total_bids_received: u64,
        #[serde(default)]
        subscription_status: SubscriptionStatus,
    },
    Supplier {
        total_bids: u64,
        won_bids: u64,
        /// Preformatted by the backend ("37.5%"); a bare number is accepted too.
        #[serde(default, deserialize_with = "win_rate")]
        win_rate: String,
    },
}

fn win_rate<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }
    Ok(match Raw::deserialize(d)? {
        Raw::Text(s) => s,
        Raw::Number(n) => format!("{n:.1}%"),
    })
}

impl DashboardStats {
    /// Label/value pairs in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        match self {
            DashboardStats::Admin {
                total_users,
                total_jobs,
                total_bids,
                active_jobs,
            } => vec![
                ("Total users", total_users.to_string()),
                ("Total jobs", total_jobs.to_string()),
                ("Total bids", total_bids.to_string()),
                ("Active jobs", active_jobs.to_string()),
            ],
            DashboardStats::Buyer {
                total_jobs,
                active_jobs,
                total_bids_received,
                subscription_status,
            } => vec![
                ("Total jobs", total_jobs.to_string()),
                ("Active jobs", active_jobs.to_string()),
                ("Bids received", total_bids_received.to_string()),
                ("Subscription", subscription_status.label().to_string()),
            ],
            DashboardStats::Supplier {
                total_bids,
                won_bids,
                win_rate,
            } => vec![
                ("Total bids", total_bids.to_string()),
                ("Won bids", won_bids.to_string()),
                ("Win rate", win_rate.clone()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn buyer_shape() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "total_jobs": 4,
            "active_jobs": 2,
            "total_bids_received": 9,
            "subscription_status": "active"
        }))
        .unwrap();
        assert!(matches!(
            stats,
            DashboardStats::Buyer { total_bids_received: 9, .. }
        ));
    }

    #[test]
    fn admin_shape_wins_over_buyer() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "total_users": 12,
            "total_jobs": 4,
            "total_bids": 30,
            "active_jobs": 3
        }))
        .unwrap();
        assert!(matches!(stats, DashboardStats::Admin { total_users: 12, .. }));
    }

    #[test]
    fn supplier_win_rate_as_backend_string() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "total_bids": 0,
            "won_bids": 0,
            "win_rate": "0%"
        }))
        .unwrap();
        assert_eq!(stats.rows()[2].1, "0%");
    }

    #[test]
    fn supplier_rows_format_win_rate() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "total_bids": 8,
            "won_bids": 3,
            "win_rate": 37.5
        }))
        .unwrap();
        let rows = stats.rows();
        assert_eq!(rows[2], ("Win rate", "37.5%".to_string()));
    }
}
