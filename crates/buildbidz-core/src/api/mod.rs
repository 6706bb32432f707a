// REST client for the marketplace backend.
//
// One `ApiClient` is shared (cheaply cloned) by the orchestrator and the
// poll tasks. It carries the bearer token; endpoint methods live in the
// submodules, grouped the way the backend groups its routes.

mod admin;
mod auth;
mod bids;
mod chat;
mod files;
mod jobs;
mod notifications;
mod payments;

pub use admin::AdminTable;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::error::{extract_detail, ApiError};

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    /// `base_url` joined with the API prefix, without a trailing slash.
    root: String,
    token: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("root", &self.root)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, api_prefix: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            root: join_root(base_url, api_prefix),
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn from_config(server: &ServerConfig) -> Result<Self, ApiError> {
        Self::new(
            &server.base_url,
            &server.api_prefix,
            Duration::from_secs(server.request_timeout_secs),
        )
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn set_token(&self, token: Option<String>) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = token;
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.root, path.trim_start_matches('/'))
    }

    /// Request that attaches the bearer token when one is set.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Request that requires a signed-in session.
    pub(crate) fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let token = self.token().ok_or(ApiError::NotAuthenticated)?;
        Ok(self.http.request(method, self.url(path)).bearer_auth(token))
    }

    /// Send and check the status, returning the raw response on success.
    pub(crate) async fn execute(&self, endpoint: &str, req: RequestBuilder) -> Result<Response, ApiError> {
        let resp = req.send().await.map_err(|e| {
            warn!(endpoint, error = %e, "request failed");
            ApiError::Transport(e)
        })?;
        let status = resp.status();
        debug!(endpoint, status = status.as_u16(), "response");
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let detail = extract_detail(&body);
        warn!(endpoint, status = status.as_u16(), %detail, "request rejected");
        Err(ApiError::Status { status, detail })
    }

    /// Send and decode a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        req: RequestBuilder,
    ) -> Result<T, ApiError> {
        let resp = self.execute(endpoint, req).await?;
        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| {
            warn!(endpoint, error = %source, "undecodable response");
            ApiError::Decode {
                endpoint: endpoint.to_string(),
                source,
            }
        })
    }

    /// Send and discard whatever body comes back.
    pub(crate) async fn send_unit(&self, endpoint: &str, req: RequestBuilder) -> Result<(), ApiError> {
        self.execute(endpoint, req).await.map(|_| ())
    }
}

fn join_root(base_url: &str, api_prefix: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let prefix = api_prefix.trim_matches('/');
    if prefix.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{prefix}")
    }
}

/// Message field of `{"message": "..."}` acknowledgements.
#[derive(Debug, Clone, serde::Deserialize)]
pub(crate) struct Ack {
    #[serde(default)]
    pub message: String,
}
