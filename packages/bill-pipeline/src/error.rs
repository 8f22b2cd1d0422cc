//! Typed errors for the bill pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Payloads are plain strings so
//! every error is `Clone` and can be kept inside a [`PipelineRun`].
//!
//! [`PipelineRun`]: crate::types::run::PipelineRun

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::types::run::Stage;

/// The delegate response could not be decoded at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("response is not valid JSON: {message}")]
pub struct ParseFailure {
    pub message: String,
}

impl ParseFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The delegate response decoded, but required fields are missing,
/// mistyped, or out of range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("response violates schema: {message}")]
pub struct SchemaViolation {
    pub message: String,
}

impl SchemaViolation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The delegate itself failed (network, auth, rate limit, timeout).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamFailure {
    /// Connection failed or the response envelope was unreadable
    #[error("network error: {message}")]
    Network { message: String },

    /// Credential rejected
    #[error("authentication rejected: {message}")]
    Auth { message: String },

    /// Provider rate limit
    #[error("rate limited: {message}")]
    RateLimited { message: String },

    /// Any other non-2xx response
    #[error("delegate API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The delegate answered without any text content
    #[error("delegate returned no text content")]
    EmptyResponse,

    /// The bounded call timeout expired
    #[error("delegate call timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// The caller cancelled the run while the call was in flight
    #[error("delegate call cancelled")]
    Cancelled,
}

/// Failure cause taxonomy shared by every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCause {
    ParseFailure,
    SchemaViolation,
    UpstreamFailure,
}

impl std::fmt::Display for ErrorCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::ParseFailure => "parse failure",
            Self::SchemaViolation => "schema violation",
            Self::UpstreamFailure => "upstream failure",
        })
    }
}

/// Errors raised by the Extractor stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    ParseFailure(#[from] ParseFailure),

    #[error(transparent)]
    SchemaViolation(#[from] SchemaViolation),

    #[error(transparent)]
    UpstreamFailure(#[from] UpstreamFailure),
}

/// Errors raised by the Benchmarker stage.
///
/// Malformed content only surfaces here when the fallback record is disabled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BenchmarkError {
    #[error(transparent)]
    UpstreamFailure(#[from] UpstreamFailure),

    #[error(transparent)]
    SchemaViolation(#[from] SchemaViolation),
}

/// Errors raised by the Reporter stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error(transparent)]
    UpstreamFailure(#[from] UpstreamFailure),

    #[error(transparent)]
    SchemaViolation(#[from] SchemaViolation),
}

/// Outcome of decoding a delegate response into a typed record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Parse(#[from] ParseFailure),

    #[error(transparent)]
    Schema(#[from] SchemaViolation),
}

impl DecodeError {
    /// Collapse into a schema violation for stages whose contract has no
    /// separate parse failure.
    pub fn into_schema_violation(self) -> SchemaViolation {
        match self {
            Self::Parse(parse) => SchemaViolation::new(parse.to_string()),
            Self::Schema(schema) => schema,
        }
    }
}

impl From<DecodeError> for ExtractionError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Parse(parse) => Self::ParseFailure(parse),
            DecodeError::Schema(schema) => Self::SchemaViolation(schema),
        }
    }
}

impl From<DecodeError> for ReportError {
    fn from(err: DecodeError) -> Self {
        Self::SchemaViolation(err.into_schema_violation())
    }
}

impl From<DecodeError> for BenchmarkError {
    fn from(err: DecodeError) -> Self {
        Self::SchemaViolation(err.into_schema_violation())
    }
}

/// Terminal failure of a pipeline run, tagged with the stage that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineFailure {
    #[error("extractor failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("benchmarker failed: {0}")]
    Benchmark(#[from] BenchmarkError),

    #[error("reporter failed: {0}")]
    Report(#[from] ReportError),
}

impl PipelineFailure {
    /// Stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Extraction(_) => Stage::Extractor,
            Self::Benchmark(_) => Stage::Benchmarker,
            Self::Report(_) => Stage::Reporter,
        }
    }

    /// Cause category, unmodified from the stage error.
    pub fn cause(&self) -> ErrorCause {
        match self {
            Self::Extraction(ExtractionError::ParseFailure(_)) => ErrorCause::ParseFailure,
            Self::Extraction(ExtractionError::SchemaViolation(_))
            | Self::Benchmark(BenchmarkError::SchemaViolation(_))
            | Self::Report(ReportError::SchemaViolation(_)) => ErrorCause::SchemaViolation,
            Self::Extraction(ExtractionError::UpstreamFailure(_))
            | Self::Benchmark(BenchmarkError::UpstreamFailure(_))
            | Self::Report(ReportError::UpstreamFailure(_)) => ErrorCause::UpstreamFailure,
        }
    }

    /// The upstream failure, when that is the cause.
    pub fn upstream(&self) -> Option<&UpstreamFailure> {
        match self {
            Self::Extraction(ExtractionError::UpstreamFailure(e))
            | Self::Benchmark(BenchmarkError::UpstreamFailure(e))
            | Self::Report(ReportError::UpstreamFailure(e)) => Some(e),
            _ => None,
        }
    }
}

impl Serialize for PipelineFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let message = match self {
            Self::Extraction(e) => e.to_string(),
            Self::Benchmark(e) => e.to_string(),
            Self::Report(e) => e.to_string(),
        };

        let mut state = serializer.serialize_struct("PipelineFailure", 3)?;
        state.serialize_field("stage", &self.stage())?;
        state.serialize_field("cause", &self.cause())?;
        state.serialize_field("message", &message)?;
        state.end()
    }
}

/// Invalid input documents. These are caller errors, raised before any
/// stage runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("document payload is empty")]
    Empty,

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },
}

/// Result type alias for document construction.
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;
