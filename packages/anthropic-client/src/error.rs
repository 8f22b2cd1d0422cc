//! Error types for the Anthropic client.

use thiserror::Error;

/// Result type for Anthropic client operations.
pub type Result<T> = std::result::Result<T, AnthropicError>;

/// Anthropic client errors.
#[derive(Debug, Error)]
pub enum AnthropicError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response, rate limit, invalid request)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl AnthropicError {
    /// HTTP status of an API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The key was rejected or lacks permission.
    pub fn is_auth(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// The account hit a rate limit.
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let auth = AnthropicError::Api {
            status: 401,
            message: "invalid x-api-key".into(),
        };
        assert!(auth.is_auth());
        assert!(!auth.is_rate_limited());

        let limited = AnthropicError::Api {
            status: 429,
            message: "rate_limit_error".into(),
        };
        assert!(limited.is_rate_limited());

        assert_eq!(AnthropicError::Network("reset".into()).status(), None);
    }
}
