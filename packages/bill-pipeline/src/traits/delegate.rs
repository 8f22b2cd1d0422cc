//! Delegate trait for the external language model.
//!
//! A delegate performs the semantic work of a stage: it receives a fixed
//! instruction (schema description plus task framing), optionally the bill
//! itself, and answers with text that should contain one JSON object.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::UpstreamFailure;
use crate::types::document::RawDocument;
use crate::types::run::Stage;

/// One request to the delegate.
#[derive(Debug, Clone)]
pub struct DelegateRequest {
    /// Stage issuing the request
    pub stage: Stage,

    /// Model identifier
    pub model: String,

    /// Instruction text, including the expected response schema
    pub instruction: String,

    /// Document sent inline (Extractor only)
    pub attachment: Option<RawDocument>,

    /// Allow live web search
    pub web_search: bool,

    /// Completion token limit
    pub max_tokens: u32,
}

impl DelegateRequest {
    /// Create a text-only request.
    pub fn new(stage: Stage, model: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            stage,
            model: model.into(),
            instruction: instruction.into(),
            attachment: None,
            web_search: false,
            max_tokens: 1000,
        }
    }

    /// Attach the bill.
    pub fn with_attachment(mut self, document: RawDocument) -> Self {
        self.attachment = Some(document);
        self
    }

    /// Allow web search.
    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.web_search = enabled;
        self
    }

    /// Set the token limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// External text/vision completion service.
///
/// Implementations return the raw text of the response. They do not parse
/// it; normalization and validation happen at the stage boundary.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Delegate: Send + Sync {
    /// Send one request and return the response text.
    async fn complete(&self, request: DelegateRequest) -> Result<String, UpstreamFailure>;
}

#[async_trait]
impl<D: Delegate + ?Sized> Delegate for Arc<D> {
    async fn complete(&self, request: DelegateRequest) -> Result<String, UpstreamFailure> {
        (**self).complete(request).await
    }
}
