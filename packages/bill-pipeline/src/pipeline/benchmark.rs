//! Benchmarker stage: `BenchmarkQuery` → `BenchmarkFacts`.
//!
//! Benchmarks are advisory. When the delegate answers but the content is
//! unusable, the configured fallback record is substituted and the outcome
//! is flagged degraded. When the delegate does not answer at all, the stage
//! fails.

use tracing::{info, warn};

use crate::error::BenchmarkError;
use crate::pipeline::call::call_delegate;
use crate::pipeline::decode::parse_response;
use crate::pipeline::prompts::format_benchmark_prompt;
use crate::pipeline::query::BenchmarkQuery;
use crate::traits::delegate::{Delegate, DelegateRequest};
use crate::types::config::PipelineConfig;
use crate::types::facts::{BenchmarkFacts, Validate};
use crate::types::run::{BenchmarkOutcome, Stage};

/// Look up comparison figures for a bill.
pub async fn benchmark<D>(
    delegate: &D,
    config: &PipelineConfig,
    query: &BenchmarkQuery,
) -> Result<BenchmarkOutcome, BenchmarkError>
where
    D: Delegate + ?Sized,
{
    let request = DelegateRequest::new(
        Stage::Benchmarker,
        &config.model,
        format_benchmark_prompt(query),
    )
    .with_web_search(config.web_search)
    .with_max_tokens(config.max_tokens);

    let raw = call_delegate(delegate, request, config.call_timeout).await?;

    match parse_response::<BenchmarkFacts>(&raw) {
        Ok(facts) => {
            info!(
                average_rate = %facts.average_rate,
                recommendations = facts.recommendations.len(),
                "Benchmark facts found"
            );
            Ok(BenchmarkOutcome::live(facts))
        }
        Err(e) => match &config.benchmark_fallback {
            Some(fallback) => {
                fallback.validate()?;
                warn!(error = %e, "Benchmark response unusable, using fallback record");
                Ok(BenchmarkOutcome::degraded(fallback.clone()))
            }
            None => Err(e.into()),
        },
    }
}
