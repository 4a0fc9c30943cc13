//! HTTP client for the token handoff endpoint.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::{debug, error};

use super::types::{SessionTokens, ShellError};

/// The handoff endpoint's store/claim operations, as a seam so the
/// deep-link listener can be exercised without a network.
#[async_trait]
pub trait TokenRelay: Send + Sync {
    /// Store a token pair under a nonce (used by bridge-page-equivalent callers).
    async fn store(&self, nonce: &str, tokens: &SessionTokens) -> Result<(), ShellError>;

    /// Claim the token pair for a nonce. One-time: a second claim fails
    /// with `HandoffNotFound`.
    async fn claim(&self, nonce: &str) -> Result<SessionTokens, ShellError>;
}

/// reqwest-backed relay client.
pub struct RelayClient {
    http: Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .user_agent(concat!("flarelog-shell/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl TokenRelay for RelayClient {
    async fn store(&self, nonce: &str, tokens: &SessionTokens) -> Result<(), ShellError> {
        debug!("Storing handoff for nonce {}...", &nonce[..nonce.len().min(8)]);

        let response = self
            .http
            .post(&self.base_url)
            .json(&json!({
                "nonce": nonce,
                "access_token": tokens.access_token,
                "refresh_token": tokens.refresh_token,
            }))
            .send()
            .await
            .map_err(|e| ShellError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Handoff store failed: {status} - {body}");
            return Err(ShellError::Api(format!("store failed: {status}")));
        }

        Ok(())
    }

    async fn claim(&self, nonce: &str) -> Result<SessionTokens, ShellError> {
        let encoded: String = url::form_urlencoded::byte_serialize(nonce.as_bytes()).collect();
        let url = format!("{}?nonce={}", self.base_url, encoded);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ShellError::Network(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ShellError::HandoffNotFound);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Handoff claim failed: {status} - {body}");
            return Err(ShellError::Api(format!("claim failed: {status}")));
        }

        response
            .json::<SessionTokens>()
            .await
            .map_err(|e| ShellError::Api(format!("Failed to parse claim response: {e}")))
    }
}
