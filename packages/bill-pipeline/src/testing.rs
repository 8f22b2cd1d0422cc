//! Testing utilities including a scripted delegate.
//!
//! These are useful for testing applications that use the bill pipeline
//! without making real model calls.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::UpstreamFailure;
use crate::traits::delegate::{Delegate, DelegateRequest};
use crate::types::document::{MediaType, RawDocument};
use crate::types::run::Stage;

/// One scripted delegate answer.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Answer with this text
    Text(String),

    /// Fail with this upstream error
    Fail(UpstreamFailure),

    /// Never answer
    Hang,
}

impl MockResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

/// Record of a call made to the scripted delegate.
#[derive(Debug, Clone)]
pub struct MockDelegateCall {
    pub stage: Stage,
    pub model: String,
    pub instruction: String,
    pub attachment: Option<MediaType>,
    pub web_search: bool,
}

/// A delegate that answers from per-stage scripts.
///
/// Each stage has a queue of responses consumed in order; the last one
/// repeats. A stage with no script fails with an API error.
#[derive(Clone, Default)]
pub struct ScriptedDelegate {
    /// Scripted responses by stage
    scripts: Arc<RwLock<HashMap<Stage, VecDeque<MockResponse>>>>,

    /// Artificial latency before each answer
    delay: Option<Duration>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockDelegateCall>>>,
}

impl ScriptedDelegate {
    /// Create a delegate with no scripts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every stage with the matching fixture.
    pub fn happy_path() -> Self {
        Self::new()
            .with_text(Stage::Extractor, fixtures::RESIDENTIAL_BILL_JSON)
            .with_text(Stage::Benchmarker, fixtures::BENCHMARK_JSON)
            .with_text(Stage::Reporter, fixtures::REPORT_JSON)
    }

    /// Queue a response for a stage.
    pub fn with_response(self, stage: Stage, response: MockResponse) -> Self {
        self.scripts
            .write()
            .unwrap()
            .entry(stage)
            .or_default()
            .push_back(response);
        self
    }

    /// Queue a text response for a stage.
    pub fn with_text(self, stage: Stage, text: impl Into<String>) -> Self {
        self.with_response(stage, MockResponse::text(text))
    }

    /// Queue a failure for a stage.
    pub fn with_failure(self, stage: Stage, failure: UpstreamFailure) -> Self {
        self.with_response(stage, MockResponse::Fail(failure))
    }

    /// Replace every script for a stage.
    pub fn replace(self, stage: Stage, response: MockResponse) -> Self {
        self.scripts
            .write()
            .unwrap()
            .insert(stage, VecDeque::from([response]));
        self
    }

    /// Delay every answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get all calls made to this delegate.
    pub fn calls(&self) -> Vec<MockDelegateCall> {
        self.calls.read().unwrap().clone()
    }

    /// Stages called, in order.
    pub fn stages_called(&self) -> Vec<Stage> {
        self.calls.read().unwrap().iter().map(|c| c.stage).collect()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    fn next_response(&self, stage: Stage) -> Option<MockResponse> {
        let mut scripts = self.scripts.write().unwrap();
        let queue = scripts.get_mut(&stage)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Delegate for ScriptedDelegate {
    async fn complete(&self, request: DelegateRequest) -> Result<String, UpstreamFailure> {
        self.calls.write().unwrap().push(MockDelegateCall {
            stage: request.stage,
            model: request.model.clone(),
            instruction: request.instruction.clone(),
            attachment: request.attachment.as_ref().map(|d| d.media_type()),
            web_search: request.web_search,
        });

        let response = self.next_response(request.stage);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match response {
            Some(MockResponse::Text(text)) => Ok(text),
            Some(MockResponse::Fail(failure)) => Err(failure),
            Some(MockResponse::Hang) => std::future::pending().await,
            None => Err(UpstreamFailure::Api {
                status: 500,
                message: format!("no scripted response for {}", request.stage),
            }),
        }
    }
}

/// Canned delegate answers and documents.
pub mod fixtures {
    use super::*;
    use crate::error::DocumentResult;

    /// Residential bill answer wrapped in a code fence.
    pub const RESIDENTIAL_BILL_JSON: &str = r#"```json
{"totalCost":187.43,"usage":1245,"ratePerKwh":0.1506,"billingPeriod":"Nov 2024","unusualCharges":["Late fee: $5.00"],"insights":"Usage up 12% from October, likely heating."}
```"#;

    /// Industrial bill answer with demand and power factor.
    pub const INDUSTRIAL_BILL_JSON: &str = r#"{"totalCost":48210.55,"usage":310000,"ratePerKwh":0.0912,"billingPeriod":"Oct 2024","demandKw":820.5,"powerFactor":0.87,"unusualCharges":["Power factor penalty: $1,240.00"],"insights":"Demand charges are 38% of the bill."}"#;

    /// Benchmark answer with surrounding prose, as web-search answers often have.
    pub const BENCHMARK_JSON: &str = r#"Based on my searches, here is the comparison:
{"averageRate":0.1642,"typicalUsage":"Typical US household uses about 900 kWh per month","recommendations":["Shift laundry and dishwashing off-peak","Check heating system efficiency"],"sources":["EIA Electric Power Monthly"]}"#;

    pub const REPORT_JSON: &str = r#"{"summary":"Your November bill is slightly below the regional average rate but usage is high.","comparison":"Rate 0.1506 vs 0.1642 average; usage 38% above a typical household.","savings":["About $20/month by trimming heating load","Avoid late fees ($5.00)"],"nextSteps":["Schedule a furnace tune-up","Enable autopay"]}"#;

    /// Reporter answer cut off before `nextSteps`.
    pub const TRUNCATED_REPORT_JSON: &str =
        r#"{"summary":"Your bill is high.","comparison":"Above average.","savings":["LED lighting"]}"#;

    /// A small PDF standing in for a scanned residential bill.
    pub fn residential_bill() -> DocumentResult<RawDocument> {
        RawDocument::new(
            b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\n%%EOF\n".to_vec(),
            MediaType::Pdf,
        )
    }

    /// A photographed bill.
    pub fn photographed_bill() -> DocumentResult<RawDocument> {
        RawDocument::new(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10], MediaType::Jpeg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripts_consumed_in_order_last_sticks() {
        let delegate = ScriptedDelegate::new()
            .with_failure(
                Stage::Benchmarker,
                UpstreamFailure::RateLimited {
                    message: "slow down".into(),
                },
            )
            .with_text(Stage::Benchmarker, "second");

        let request = || DelegateRequest::new(Stage::Benchmarker, "m", "x");
        assert!(delegate.complete(request()).await.is_err());
        assert_eq!(delegate.complete(request()).await.unwrap(), "second");
        assert_eq!(delegate.complete(request()).await.unwrap(), "second");
        assert_eq!(delegate.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_unscripted_stage_fails() {
        let delegate = ScriptedDelegate::new();
        let err = delegate
            .complete(DelegateRequest::new(Stage::Reporter, "m", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamFailure::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_records_attachment() {
        let delegate = ScriptedDelegate::happy_path();
        delegate
            .complete(
                DelegateRequest::new(Stage::Extractor, "m", "x")
                    .with_attachment(fixtures::photographed_bill().unwrap()),
            )
            .await
            .unwrap();

        let calls = delegate.calls();
        assert_eq!(calls[0].attachment, Some(MediaType::Jpeg));
        assert_eq!(calls[0].model, "m");
        assert_eq!(delegate.stages_called(), vec![Stage::Extractor]);

        delegate.clear_calls();
        assert!(delegate.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delay_applies_before_answer() {
        let delegate = ScriptedDelegate::happy_path().with_delay(Duration::from_millis(20));
        let started = std::time::Instant::now();
        delegate
            .complete(DelegateRequest::new(Stage::Reporter, "m", "x"))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
