// Bid endpoints: list, submit, award.

use reqwest::Method;

use super::{Ack, ApiClient};
use crate::error::ApiError;
use crate::model::{Bid, NewBid, SalesmanBid};

impl ApiClient {
    /// Bids on one job. Owner or admin only.
    pub async fn job_bids(&self, job_id: &str) -> Result<Vec<Bid>, ApiError> {
        let path = format!("jobs/{job_id}/bids");
        let builder = self.authed(Method::GET, &path)?;
        self.send_json(&path, builder).await
    }

    pub async fn my_bids(&self) -> Result<Vec<Bid>, ApiError> {
        let builder = self.authed(Method::GET, "bids/my")?;
        self.send_json("bids/my", builder).await
    }

    pub async fn submit_bid(&self, job_id: &str, bid: &NewBid) -> Result<Bid, ApiError> {
        let path = format!("jobs/{job_id}/bids");
        let builder = self.authed(Method::POST, &path)?.json(bid);
        self.send_json(&path, builder).await
    }

    pub async fn submit_salesman_bid(&self, job_id: &str, bid: &SalesmanBid) -> Result<Bid, ApiError> {
        let path = format!("jobs/{job_id}/salesman-bids");
        let builder = self.authed(Method::POST, &path)?.json(bid);
        self.send_json(&path, builder).await
    }

    /// Award `bid_id` on `job_id`. The server rejects the other bids.
    pub async fn award_bid(&self, job_id: &str, bid_id: &str) -> Result<String, ApiError> {
        let path = format!("jobs/{job_id}/award/{bid_id}");
        let builder = self.authed(Method::POST, &path)?;
        let ack: Ack = self.send_json(&path, builder).await?;
        Ok(ack.message)
    }
}
