//! Agent Backend Client
//!
//! The agent backend is an external service that owns the conversation and
//! produces the replies. The proxy only needs one call from it, expressed by
//! the `AgentBackend` trait so handlers can be exercised without a network.

use async_trait::async_trait;
use axum::body::Bytes;
use movie_genius_core::protocol::{CHAT_PATH, MESSAGE_PARAM, SESSION_ID_PARAM};
use reqwest::{
    StatusCode, Url,
    header::{CACHE_CONTROL, PRAGMA},
};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Invalid agent backend URL: {0}")]
    InvalidUrl(String),
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
    #[error("Agent backend unreachable: {0}")]
    Transport(String),
}

/// The raw outcome of a backend call that produced an HTTP response.
#[derive(Debug, Clone)]
pub struct BackendReply {
    pub status: StatusCode,
    pub body: Bytes,
}

/// A client for the agent backend's chat endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Sends one message for `session_id`.
    ///
    /// Any HTTP response, successful or not, is returned as a `BackendReply`;
    /// an `Err` means the backend could not be reached at all.
    async fn chat(&self, message: &str, session_id: &str) -> Result<BackendReply, BackendError>;
}

/// An `AgentBackend` reached over HTTP.
pub struct HttpAgentBackend {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpAgentBackend {
    /// Creates a client for the backend at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The backend's base address; the chat path is appended to it.
    /// * `timeout` - Upper bound on a whole backend call, if any.
    pub fn new(base_url: &Url, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let endpoint = base_url
            .join(CHAT_PATH)
            .map_err(|e| BackendError::InvalidUrl(e.to_string()))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::Client(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AgentBackend for HttpAgentBackend {
    async fn chat(&self, message: &str, session_id: &str) -> Result<BackendReply, BackendError> {
        debug!(endpoint = %self.endpoint, "Calling agent backend");

        // Every call must reach the live agent, never a cache.
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[(MESSAGE_PARAM, message), (SESSION_ID_PARAM, session_id)])
            .header(CACHE_CONTROL, "no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            // The status line already arrived; keep it even if the error body is cut off.
            Err(e) if !status.is_success() => {
                warn!(%status, error = %e, "Failed to read agent backend error body");
                Bytes::new()
            }
            Err(e) => return Err(BackendError::Transport(e.to_string())),
        };

        Ok(BackendReply { status, body })
    }
}
