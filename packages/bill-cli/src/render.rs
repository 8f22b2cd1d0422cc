//! Terminal rendering of a pipeline run.
//!
//! Every populated field is shown, so a run that failed late still prints
//! what the earlier stages produced.

use bill_pipeline::{BenchmarkFacts, BillFacts, PipelineRun, PipelineState, Report, Stage};
use colored::Colorize;
use std::fmt::Write as _;

const LABEL_WIDTH: usize = 18;

pub fn render_run(run: &PipelineRun) -> String {
    let mut out = String::new();

    if let Some(bill) = run.bill_facts() {
        render_bill(&mut out, bill);
    }
    if let Some(bench) = run.benchmark_facts() {
        render_benchmark(&mut out, bench, run.is_benchmark_degraded());
    }
    if let Some(report) = run.report() {
        render_report(&mut out, report);
    }

    match run.failure() {
        Some(failure) => {
            let _ = writeln!(
                out,
                "{} {} ({}): {}",
                "✗".red().bold(),
                failure.stage().title().red().bold(),
                failure.cause(),
                failure
            );
        }
        None if run.state() == PipelineState::Complete => {
            let _ = writeln!(out, "{} {}", "✓".green().bold(), "Analysis complete".green());
        }
        None => {}
    }

    out
}

/// Progress line printed when a stage starts.
pub fn render_progress(stage: Stage) -> String {
    format!(
        "{} {} {}",
        format!("[{}/{}]", stage.ordinal(), Stage::ALL.len()).dimmed(),
        stage.title().bold(),
        stage.description().dimmed()
    )
}

fn heading(out: &mut String, stage: Stage, note: Option<&str>) {
    let _ = write!(out, "\n{}", stage.title().cyan().bold());
    if let Some(note) = note {
        let _ = write!(out, " {}", note.yellow());
    }
    out.push('\n');
}

fn field(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "  {:<width$}{}", label, value, width = LABEL_WIDTH);
}

fn list(out: &mut String, label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "  {}", label.bold());
    for item in items {
        let _ = writeln!(out, "    • {}", item);
    }
}

fn render_bill(out: &mut String, bill: &BillFacts) {
    heading(out, Stage::Extractor, None);
    field(out, "Total cost", format!("${}", bill.total_cost));
    field(out, "Usage", format!("{} kWh", bill.usage));
    field(out, "Rate", format!("${}/kWh", bill.rate_per_kwh));
    field(out, "Billing period", &bill.billing_period);
    if let Some(demand) = bill.demand_kw {
        field(out, "Peak demand", format!("{} kW", demand));
    }
    if let Some(pf) = bill.power_factor {
        field(out, "Power factor", pf);
    }
    if !bill.insights.trim().is_empty() {
        field(out, "Insights", &bill.insights);
    }
    list(out, "Unusual charges", &bill.unusual_charges);
}

fn render_benchmark(out: &mut String, bench: &BenchmarkFacts, degraded: bool) {
    heading(
        out,
        Stage::Benchmarker,
        degraded.then_some("(fallback figures, live research unavailable)"),
    );
    field(out, "Average rate", format!("${}/kWh", bench.average_rate));
    if let Some(charge) = bench.average_demand_charge {
        field(out, "Avg demand charge", format!("${}/kW", charge));
    }
    field(out, "Typical usage", &bench.typical_usage);
    list(out, "Recommendations", &bench.recommendations);
    list(out, "Sources", &bench.sources);
}

fn render_report(out: &mut String, report: &Report) {
    heading(out, Stage::Reporter, None);
    let _ = writeln!(out, "  {}", report.summary);
    let _ = writeln!(out, "\n  {} {}", "Comparison:".bold(), report.comparison);
    list(out, "Potential savings", &report.savings);

    if !report.next_steps.is_empty() {
        let _ = writeln!(out, "  {}", "Next steps".bold());
        for (i, step) in report.next_steps.iter().enumerate() {
            let _ = writeln!(out, "    {}. {}", i + 1, step);
        }
    }
    out.push('\n');
}
