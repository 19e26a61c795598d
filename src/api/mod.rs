//! HTTP client for the remote story/user API.
//!
//! One [`ApiClient`] is built at startup and cheaply cloned afterwards
//! (`reqwest::Client` is an `Arc` internally). Wire types are private to the
//! endpoint modules — callers only ever see the domain records.

mod stories;
mod users;

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure: connection refused, DNS, timeout.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status. Carries the decoded
    /// error envelope when the body has one, the raw body otherwise.
    #[error("server rejected request: {0}")]
    Rejected(String),

    /// The body of a successful response did not decode.
    #[error("invalid response body: {0}")]
    Decode(String),
}

// ── Client ────────────────────────────────────────────────────────────────────

/// Typed client for the story service. All endpoint methods live in the
/// `stories` and `users` submodules as further `impl ApiClient` blocks.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client with a per-request timeout. `base_url` must not end in
    /// a slash (config strips it).
    pub fn new(base_url: impl Into<String>, timeout_seconds: u64) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url: base_url.into() })
    }

    /// Lightweight reachability probe.
    ///
    /// Any HTTP response (including 4xx) means the server is reachable; only
    /// a transport-level failure is treated as unreachable. Uses a hard
    /// 5-second timeout regardless of the configured request timeout.
    pub async fn ping(&self) -> Result<(), ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build ping client: {e}")))?;
        client
            .head(&self.base_url)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| ApiError::Transport(format!("unreachable: {e}")))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

// ── Status / error envelope ───────────────────────────────────────────────────

// Error envelope used by the story service:
// `{"error": {"status": 404, "title": "Not Found", "message": "..."}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    title: Option<String>,
}

/// Consume the response and return it if successful, or a structured error.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = if let Ok(env) = serde_json::from_str::<ErrorEnvelope>(&body) {
        let title = env
            .error
            .title
            .map(|t| format!(" [{t}]"))
            .unwrap_or_default();
        format!("HTTP {status}{title}: {}", env.error.message)
    } else {
        format!("HTTP {status}: {body}")
    };

    error!(%status, %message, "API request returned HTTP error");
    Err(ApiError::Rejected(message))
}
