//! Pure Anthropic Messages API client
//!
//! A minimal client for the Anthropic Messages API with no domain-specific logic.
//! Supports text, inline image and document blocks, and server-side tools
//! such as web search.
//!
//! # Example
//!
//! ```rust,ignore
//! use anthropic_client::{AnthropicClient, ContentBlock, Message, MessagesRequest};
//!
//! let client = AnthropicClient::from_env()?;
//!
//! let response = client
//!     .messages(
//!         MessagesRequest::new("claude-sonnet-4-20250514", 1000).message(Message::user_blocks(vec![
//!             ContentBlock::document("application/pdf", &pdf_bytes),
//!             ContentBlock::text("Summarize this document"),
//!         ])),
//!     )
//!     .await?;
//!
//! println!("{}", response.text());
//! ```

pub mod error;
pub mod types;

pub use error::{AnthropicError, Result};
pub use types::*;

use reqwest::Client;
use tracing::{debug, warn};

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// API version header value.
pub const API_VERSION: &str = "2023-06-01";

/// Error bodies are cut to this size before they reach logs or error messages.
const MAX_ERROR_BODY_BYTES: usize = 2048;

/// Pure Anthropic API client.
#[derive(Clone)]
pub struct AnthropicClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from environment variable `ANTHROPIC_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| AnthropicError::Config("ANTHROPIC_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for proxies, gateways, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a preconfigured `reqwest` client (timeouts, proxies).
    pub fn with_http_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a Messages API request.
    pub async fn messages(&self, request: MessagesRequest) -> Result<MessagesResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Anthropic request failed");
                AnthropicError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorEnvelope>(&error_text) {
                Ok(envelope) => format!("{}: {}", envelope.error.error_type, envelope.error.message),
                Err(_) => truncate_to_char_boundary(&error_text, MAX_ERROR_BODY_BYTES).to_string(),
            };
            warn!(status = %status, error = %message, "Anthropic API error");
            return Err(AnthropicError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let messages_response: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AnthropicError::Parse(e.to_string()))?;

        debug!(
            model = %request.model,
            stop_reason = ?messages_response.stop_reason,
            output_tokens = messages_response.usage.as_ref().map(|u| u.output_tokens),
            duration_ms = start.elapsed().as_millis(),
            "Anthropic messages call"
        );

        Ok(messages_response)
    }
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}
