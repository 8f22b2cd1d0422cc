//! Anthropic implementation of the Delegate trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use bill_pipeline::ai::AnthropicDelegate;
//! use bill_pipeline::{DelegateCredentials, Pipeline};
//!
//! let delegate = AnthropicDelegate::new(&DelegateCredentials::new(api_key));
//! let pipeline = Pipeline::new(delegate);
//! ```

use anthropic_client::{
    AnthropicClient, AnthropicError, ContentBlock, Message, MessagesRequest, ServerTool,
};
use async_trait::async_trait;
use tracing::debug;

use crate::error::UpstreamFailure;
use crate::security::DelegateCredentials;
use crate::traits::delegate::{Delegate, DelegateRequest};

/// Web searches allowed per benchmark call.
const WEB_SEARCH_MAX_USES: u32 = 5;

/// Delegate backed by the Anthropic Messages API.
#[derive(Clone, Debug)]
pub struct AnthropicDelegate {
    client: AnthropicClient,
}

impl AnthropicDelegate {
    /// Create a delegate from credentials.
    pub fn new(credentials: &DelegateCredentials) -> Self {
        let mut client = AnthropicClient::new(credentials.api_key.expose());
        if let Some(base_url) = &credentials.base_url {
            client = client.with_base_url(base_url);
        }
        Self { client }
    }

    /// Wrap an already-configured client.
    pub fn from_client(client: AnthropicClient) -> Self {
        Self { client }
    }

    fn build_request(request: &DelegateRequest) -> MessagesRequest {
        let mut blocks = Vec::with_capacity(2);
        if let Some(doc) = &request.attachment {
            let mime = doc.media_type().as_mime();
            blocks.push(if doc.media_type().is_image() {
                ContentBlock::image(mime, doc.bytes())
            } else {
                ContentBlock::document(mime, doc.bytes())
            });
        }
        blocks.push(ContentBlock::text(request.instruction.as_str()));

        let mut messages = MessagesRequest::new(request.model.as_str(), request.max_tokens)
            .message(Message::user_blocks(blocks));
        if request.web_search {
            messages = messages.tool(ServerTool::web_search().with_max_uses(WEB_SEARCH_MAX_USES));
        }
        messages
    }
}

#[async_trait]
impl Delegate for AnthropicDelegate {
    async fn complete(&self, request: DelegateRequest) -> Result<String, UpstreamFailure> {
        let response = self
            .client
            .messages(Self::build_request(&request))
            .await
            .map_err(upstream_from)?;

        debug!(
            stage = %request.stage,
            stop_reason = ?response.stop_reason,
            output_tokens = response.usage.as_ref().map(|u| u.output_tokens),
            "Anthropic response received"
        );

        if !response.has_text() {
            return Err(UpstreamFailure::EmptyResponse);
        }
        Ok(response.text())
    }
}

/// Map client errors onto the pipeline's upstream taxonomy.
pub fn upstream_from(err: AnthropicError) -> UpstreamFailure {
    match err {
        AnthropicError::Api { status, message } => match status {
            401 | 403 => UpstreamFailure::Auth { message },
            429 => UpstreamFailure::RateLimited { message },
            _ => UpstreamFailure::Api { status, message },
        },
        AnthropicError::Config(message) => UpstreamFailure::Auth { message },
        AnthropicError::Network(message) | AnthropicError::Parse(message) => {
            UpstreamFailure::Network { message }
        }
    }
}
