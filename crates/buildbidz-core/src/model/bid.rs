// Bids on jobs, including salesman bids placed for unregistered companies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::job::JobCategory;
use super::timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    Submitted,
    Awarded,
    Rejected,
}

impl fmt::Display for BidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BidStatus::Submitted => "submitted",
            BidStatus::Awarded => "awarded",
            BidStatus::Rejected => "rejected",
        })
    }
}

/// Bidder contact details the owner sees on received bids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierInfo {
    pub company_name: String,
    #[serde(default)]
    pub contact_phone: String,
}

/// Job summary attached to bids in the "my bids" listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidJobInfo {
    pub title: String,
    pub category: JobCategory,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: String,
    pub job_id: String,
    pub supplier_id: String,
    pub price_quote: f64,
    #[serde(default)]
    pub delivery_estimate: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: BidStatus,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub supplier_info: Option<SupplierInfo>,
    #[serde(default)]
    pub job_info: Option<BidJobInfo>,

    // Present only on bids a salesman placed.
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_contact_phone: Option<String>,
    #[serde(default)]
    pub company_email: Option<String>,
    #[serde(default)]
    pub company_gst_number: Option<String>,
    #[serde(default)]
    pub company_address: Option<String>,
}

impl Bid {
    /// Company shown as the bidder: the represented company for salesman
    /// bids, otherwise the supplier's own company when known.
    pub fn bidder_name(&self) -> &str {
        self.company_name
            .as_deref()
            .or(self.supplier_info.as_ref().map(|s| s.company_name.as_str()))
            .unwrap_or("Unknown supplier")
    }

    pub fn is_salesman_bid(&self) -> bool {
        self.company_name.is_some()
    }
}

/// Body for `POST /jobs/{id}/bids`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBid {
    pub price_quote: f64,
    pub delivery_estimate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body for `POST /jobs/{id}/salesman-bids`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesmanBid {
    pub price_quote: f64,
    pub delivery_estimate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub company_name: String,
    pub company_contact_phone: String,
    pub company_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_gst_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_address: Option<String>,
}

#[cfg(test)]
pub(crate) fn sample_bid(id: &str, job_id: &str, supplier_id: &str, status: BidStatus) -> Bid {
    Bid {
        id: id.to_string(),
        job_id: job_id.to_string(),
        supplier_id: supplier_id.to_string(),
        price_quote: 125_000.0,
        delivery_estimate: "10 days".to_string(),
        notes: None,
        status,
        created_at: None,
        supplier_info: None,
        job_info: None,
        company_name: None,
        company_contact_phone: None,
        company_email: None,
        company_gst_number: None,
        company_address: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_received_bid_with_supplier_info() {
        let bid: Bid = serde_json::from_value(json!({
            "id": "b-1",
            "job_id": "j-1",
            "supplier_id": "s-1",
            "price_quote": 98000,
            "delivery_estimate": "1 week",
            "notes": null,
            "status": "submitted",
            "created_at": "2025-03-02T09:00:00",
            "supplier_info": {"company_name": "Steelworks", "contact_phone": "123"}
        }))
        .unwrap();
        assert_eq!(bid.price_quote, 98000.0);
        assert_eq!(bid.bidder_name(), "Steelworks");
        assert!(!bid.is_salesman_bid());
    }

    #[test]
    fn salesman_company_takes_precedence() {
        let mut bid = sample_bid("b", "j", "sm", BidStatus::Submitted);
        bid.company_name = Some("Local Traders".into());
        bid.supplier_info = Some(SupplierInfo {
            company_name: "Sales Co".into(),
            contact_phone: String::new(),
        });
        assert_eq!(bid.bidder_name(), "Local Traders");
        assert!(bid.is_salesman_bid());
    }

    #[test]
    fn unknown_bidder_falls_back() {
        let bid = sample_bid("b", "j", "s", BidStatus::Submitted);
        assert_eq!(bid.bidder_name(), "Unknown supplier");
    }

    #[test]
    fn new_bid_without_notes_omits_key() {
        let v = serde_json::to_value(NewBid {
            price_quote: 1500.5,
            delivery_estimate: "3 days".into(),
            notes: None,
        })
        .unwrap();
        assert_eq!(v["price_quote"], 1500.5);
        assert!(v.get("notes").is_none());
    }
}
