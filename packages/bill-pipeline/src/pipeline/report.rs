//! Reporter stage: bill facts + benchmark facts → `Report`.

use tracing::info;

use crate::error::ReportError;
use crate::pipeline::call::call_delegate;
use crate::pipeline::decode::parse_response;
use crate::pipeline::prompts::format_report_prompt;
use crate::traits::delegate::{Delegate, DelegateRequest};
use crate::types::config::PipelineConfig;
use crate::types::facts::{BenchmarkFacts, BillFacts, Report};
use crate::types::run::Stage;

/// Compile the final report.
///
/// Truncated or prose-only output is a schema violation here; there is no
/// fallback report.
pub async fn report<D>(
    delegate: &D,
    config: &PipelineConfig,
    bill: &BillFacts,
    benchmark: &BenchmarkFacts,
) -> Result<Report, ReportError>
where
    D: Delegate + ?Sized,
{
    let request = DelegateRequest::new(
        Stage::Reporter,
        &config.model,
        format_report_prompt(bill, benchmark),
    )
    .with_max_tokens(config.max_tokens);

    let raw = call_delegate(delegate, request, config.call_timeout).await?;
    let report: Report = parse_response(&raw)?;

    info!(
        savings = report.savings.len(),
        next_steps = report.next_steps.len(),
        "Report compiled"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamFailure;
    use crate::traits::delegate::MockDelegate;
    use rust_decimal::Decimal;

    fn bill() -> BillFacts {
        BillFacts {
            total_cost: Decimal::new(18743, 2),
            usage: Decimal::from(1245),
            rate_per_kwh: Decimal::new(1506, 4),
            billing_period: "Nov 2024".to_string(),
            demand_kw: None,
            power_factor: None,
            unusual_charges: vec![],
            insights: String::new(),
        }
    }

    #[tokio::test]
    async fn test_fenced_report() {
        let mut mock = MockDelegate::new();
        mock.expect_complete()
            .withf(|request| {
                request.stage == Stage::Reporter
                    && request.attachment.is_none()
                    && !request.web_search
                    && request.instruction.contains("Nov 2024")
            })
            .returning(|_| {
                Ok("```json\n{\"summary\": \"Slightly above average.\", \"comparison\": \"Rate is 16% above typical.\", \"savings\": [\"$15/month from off-peak laundry\"], \"nextSteps\": [\"Ask about time-of-use plans\"]}\n```".to_string())
            });

        let report = report(
            &mock,
            &PipelineConfig::default(),
            &bill(),
            &BenchmarkFacts::conservative_default(),
        )
        .await
        .unwrap();

        assert_eq!(report.summary, "Slightly above average.");
        assert_eq!(report.next_steps, vec!["Ask about time-of-use plans"]);
    }

    #[tokio::test]
    async fn test_truncated_report_is_schema_violation() {
        let mut mock = MockDelegate::new();
        mock.expect_complete()
            .returning(|_| Ok(r#"{"summary": "Your bill is", "comparison": "#.to_string()));

        let err = report(
            &mock,
            &PipelineConfig::default(),
            &bill(),
            &BenchmarkFacts::conservative_default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ReportError::SchemaViolation(_)));
    }

    #[tokio::test]
    async fn test_missing_next_steps_is_schema_violation() {
        let mut mock = MockDelegate::new();
        mock.expect_complete().returning(|_| {
            Ok(r#"{"summary": "s", "comparison": "c", "savings": []}"#.to_string())
        });

        let err = report(
            &mock,
            &PipelineConfig::default(),
            &bill(),
            &BenchmarkFacts::conservative_default(),
        )
        .await
        .unwrap_err();
        match err {
            ReportError::SchemaViolation(violation) => {
                assert!(violation.message.contains("nextSteps"))
            }
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let mut mock = MockDelegate::new();
        mock.expect_complete()
            .returning(|_| Err(UpstreamFailure::EmptyResponse));

        let err = report(
            &mock,
            &PipelineConfig::default(),
            &bill(),
            &BenchmarkFacts::conservative_default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err, ReportError::UpstreamFailure(UpstreamFailure::EmptyResponse));
    }
}
