//! HTTP client for the Zendesk API.
//!
//! This module provides `ZendeskClient`, the [`HelpdeskApi`] implementation
//! that talks to `/api/v2/search.json` and `/api/v2/tickets/destroy_many.json`
//! using HTTP Basic auth with `{email}/token` and the API key.
//!
//! Requests are never retried. Non-success responses are classified into
//! specific [`ZdeskError`] variants so the user sees why the command stopped.
//!
//! # Security
//!
//! The API key is never logged. Error bodies are sanitized and truncated, and
//! pagination cursors are only followed on the configured host so credentials
//! are never sent elsewhere.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use url::Url;

use crate::config::Config;
use crate::engine::{HelpdeskApi, SearchQuery, BULK_DELETE_LIMIT};
use crate::error::{Result, ZdeskError};
use crate::identity::Identity;
use crate::models::{DestroyManyResponse, ResultPage};

/// Maximum length for HTTP error response bodies.
const MAX_ERROR_BODY_LEN: usize = 500;

/// Client identification sent with every request.
const USER_AGENT: &str = concat!("zdesk/", env!("CARGO_PKG_VERSION"));

/// HTTP client for one authenticated Zendesk account.
pub struct ZendeskClient {
    /// The underlying HTTP client.
    http: Client,

    /// Base URL, e.g. `https://acme.zendesk.com`, without trailing slash.
    base_url: String,

    /// Host of `base_url`; cursors must point here.
    host: String,

    /// Identity used for every request.
    /// SECURITY: never log the API key!
    identity: Identity,
}

impl ZendeskClient {
    /// Creates a client for `identity` using the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ZdeskError::Http` if the HTTP client fails to initialize, or
    /// `ZdeskError::Config` if the resulting base URL is not a valid URL.
    pub fn new(config: &Config, identity: Identity) -> Result<Self> {
        Self::with_base_url(config.base_url_for(&identity.domain), identity)
    }

    /// Creates a client against an explicit base URL.
    pub fn with_base_url(base_url: impl Into<String>, identity: Identity) -> Result<Self> {
        // Remove trailing slash for consistency
        let base_url = base_url.into().trim_end_matches('/').to_string();
        // Remember the host so pagination cursors can be checked against it
        let host = Url::parse(&base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .ok_or_else(|| {
                ZdeskError::invalid_config(format!("invalid API base URL: {}", base_url))
            })?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(ZdeskError::Http)?;

        Ok(Self {
            http,
            base_url,
            host,
            identity,
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The identity this client authenticates as.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Returns the API key for sanitizing messages, never for logging.
    pub fn api_key_for_sanitization(&self) -> &str {
        self.identity.api_key_str()
    }

    /// Builds the bulk delete URL for `ids`.
    fn destroy_many_url(&self, ids: &[u64]) -> String {
        let joined = ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}/api/v2/tickets/destroy_many.json?ids={}",
            self.base_url, joined
        )
    }

    /// Checks that a pagination cursor stays on the configured host.
    fn validate_cursor(&self, url: &str) -> Result<()> {
        let parsed = Url::parse(url)
            .map_err(|e| ZdeskError::validation(format!("invalid page URL: {}", e)))?;
        // Cursors come from the server but must never leave the API host
        if parsed.host_str() != Some(self.host.as_str()) {
            return Err(ZdeskError::validation(format!(
                "page URL host mismatch: expected {:?}, got {:?}",
                self.host,
                parsed.host_str()
            )));
        }
        Ok(())
    }

    /// Starts an authenticated request.
    fn authed(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            // Zendesk API token auth: "{email}/token" as the user name
            .basic_auth(
                format!("{}/token", self.identity.email),
                Some(self.identity.api_key_str()),
            )
            .header("Accept", "application/json")
    }

    /// Sends a request and returns the body of a successful response.
    async fn send(&self, method: Method, url: &str) -> Result<String> {
        tracing::debug!(method = %method, url = %url, "Making Zendesk API request");

        let response = self
            .authed(method, url)
            .send()
            .await
            .map_err(ZdeskError::Http)?;
        let status = response.status();

        if !status.is_success() {
            return Err(self.handle_http_error(status, response).await);
        }

        let body = response.text().await.map_err(ZdeskError::Http)?;
        tracing::trace!(body = %body, "Zendesk API response");
        Ok(body)
    }

    /// Converts a non-success response into a `ZdeskError`.
    async fn handle_http_error(
        &self,
        status: StatusCode,
        response: reqwest::Response,
    ) -> ZdeskError {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        // Never echo the API key back in an error
        let body = response.text().await.unwrap_or_default();
        let body = ZdeskError::sanitize_message(&body, self.identity.api_key_str());
        let body = truncate_body(body);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ZdeskError::Authentication,
            StatusCode::TOO_MANY_REQUESTS => {
                tracing::warn!(?retry_after, "Rate limited by Zendesk");
                ZdeskError::RateLimited { retry_after }
            }
            StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => {
                tracing::warn!(status = %status, "Zendesk temporarily unavailable");
                ZdeskError::ServiceUnavailable { status }
            }
            _ => ZdeskError::HttpStatus { status, body },
        }
    }
}

/// Truncates at a char boundary so verbose error pages stay readable.
fn truncate_body(body: String) -> String {
    if body.len() <= MAX_ERROR_BODY_LEN {
        return body;
    }
    let mut end = MAX_ERROR_BODY_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}

#[async_trait]
impl HelpdeskApi for ZendeskClient {
    fn search_url(&self, query: &SearchQuery) -> String {
        format!("{}/api/v2/search.json?query={}", self.base_url, query.encoded())
    }

    async fn fetch_page(&self, url: &str) -> Result<ResultPage> {
        self.validate_cursor(url)?;
        let body = self.send(Method::GET, url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn destroy_many(&self, ids: &[u64]) -> Result<()> {
        if ids.is_empty() {
            return Err(ZdeskError::validation("bulk delete needs at least one id"));
        }
        if ids.len() > BULK_DELETE_LIMIT {
            return Err(ZdeskError::validation(format!(
                "bulk delete accepts at most {} ids, got {}",
                BULK_DELETE_LIMIT,
                ids.len()
            )));
        }

        let url = self.destroy_many_url(ids);
        // The server deletes asynchronously and answers with a job status
        let body = self.send(Method::DELETE, &url).await?;

        match serde_json::from_str::<DestroyManyResponse>(&body)
            .ok()
            .and_then(|r| r.job_status)
        {
            Some(job) => tracing::debug!(
                job_id = %job.id,
                status = ?job.status,
                count = ids.len(),
                "Bulk delete accepted"
            ),
            None => tracing::debug!(count = ids.len(), "Bulk delete accepted"),
        }
        Ok(())
    }
}
