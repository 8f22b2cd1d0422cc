//! Drive a full pipeline run against the scripted delegate.
//!
//! Shows how a caller observes progress and reads partial results without
//! any network access. Swap `ScriptedDelegate` for `AnthropicDelegate`
//! (feature `anthropic`) to run against the real API.
//!
//! ```sh
//! cargo run -p bill-pipeline --example scripted_run
//! ```

use bill_pipeline::testing::{fixtures, MockResponse, ScriptedDelegate};
use bill_pipeline::{Pipeline, PipelineRun, Stage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Benchmarker answers with prose, so the run finishes in degraded mode.
    let delegate = ScriptedDelegate::happy_path().replace(
        Stage::Benchmarker,
        MockResponse::text("Rates depend on your region."),
    );
    let pipeline = Pipeline::new(delegate);

    let observer = |run: &PipelineRun| println!("-> {}", run.state());
    let run = pipeline
        .run_observed(&fixtures::residential_bill()?, &observer)
        .await;

    if let Some(bill) = run.bill_facts() {
        println!("bill: ${} for {} kWh ({})", bill.total_cost, bill.usage, bill.billing_period);
    }
    if let Some(bench) = run.benchmark_facts() {
        println!(
            "benchmark: ${}/kWh{}",
            bench.average_rate,
            if run.is_benchmark_degraded() { " (fallback)" } else { "" }
        );
    }
    match (run.report(), run.failure()) {
        (Some(report), _) => println!("report: {}", report.summary),
        (None, Some(failure)) => println!("failed: {}", failure),
        (None, None) => {}
    }

    println!("\n{}", serde_json::to_string_pretty(&run)?);
    Ok(())
}
