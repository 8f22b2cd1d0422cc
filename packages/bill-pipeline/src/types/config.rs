//! Configuration for the analysis pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::facts::BenchmarkFacts;

/// Default model for every stage.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Configuration shared by the three stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Model identifier passed to the delegate.
    pub model: String,

    /// Completion token limit per stage call.
    ///
    /// Default: 1000.
    pub max_tokens: u32,

    /// Upper bound on each delegate call.
    ///
    /// Expiry fails the stage with an upstream timeout. Default: 60s.
    #[serde(with = "duration_secs")]
    pub call_timeout: Duration,

    /// Let the Benchmarker use live web search.
    ///
    /// When false the delegate answers from its own knowledge.
    /// Default: true.
    pub web_search: bool,

    /// Record substituted when benchmark content is unusable.
    ///
    /// `None` disables degraded mode: malformed benchmark output then fails
    /// the run like any other stage. Default: [`BenchmarkFacts::conservative_default`].
    pub benchmark_fallback: Option<BenchmarkFacts>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1000,
            call_timeout: Duration::from_secs(60),
            web_search: true,
            benchmark_fallback: Some(BenchmarkFacts::conservative_default()),
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the token limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the per-call timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Enable or disable web search for benchmarks.
    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.web_search = enabled;
        self
    }

    /// Replace the fallback benchmark record.
    ///
    /// The record is validated when substituted; a fallback with negative
    /// figures fails the Benchmarker instead of entering the run.
    pub fn with_benchmark_fallback(mut self, fallback: BenchmarkFacts) -> Self {
        self.benchmark_fallback = Some(fallback);
        self
    }

    /// Treat malformed benchmark output as a hard failure.
    pub fn without_benchmark_fallback(mut self) -> Self {
        self.benchmark_fallback = None;
        self
    }
}

/// Serialize a `Duration` as fractional seconds.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
