// Job endpoints.

use reqwest::Method;

use super::ApiClient;
use crate::error::ApiError;
use crate::model::{Job, NewJob};

impl ApiClient {
    /// Open jobs, newest first.
    pub async fn open_jobs(&self) -> Result<Vec<Job>, ApiError> {
        let builder = self.authed(Method::GET, "jobs")?;
        self.send_json("jobs", builder).await
    }

    /// Jobs posted by the signed-in buyer.
    pub async fn my_jobs(&self) -> Result<Vec<Job>, ApiError> {
        let builder = self.authed(Method::GET, "jobs/my")?;
        self.send_json("jobs/my", builder).await
    }

    pub async fn create_job(&self, job: &NewJob) -> Result<Job, ApiError> {
        let builder = self.authed(Method::POST, "jobs")?.json(job);
        self.send_json("jobs", builder).await
    }
}
