//! Stage instructions sent to the delegate.
//!
//! Each instruction frames the task and embeds the response schema generated
//! from the record type, so prompt and validator cannot drift apart.

use crate::pipeline::query::BenchmarkQuery;
use crate::pipeline::schema::response_schema;
use crate::types::facts::{BenchmarkFacts, BillFacts, Report};

/// Instruction for reading the attached bill.
pub const EXTRACT_PROMPT: &str = r#"Analyze the attached energy bill.

Extract:
- total cost for the billing period
- energy usage in kWh
- rate per kWh (total energy charges divided by usage if not printed)
- the billing period as printed on the bill
- peak demand in kW and power factor, only if the bill shows them
- any unusual charges (late fees, adjustments, one-off surcharges)
- a short insight about the bill

All numbers are plain non-negative numbers without currency symbols or units.

Respond ONLY with valid JSON (no markdown) matching this schema:
{schema}"#;

/// Instruction for finding comparison figures.
pub const BENCHMARK_PROMPT: &str = r#"Research industry benchmarks for: {context}

Find average rates, typical usage patterns, and cost-saving recommendations.
Include the average demand charge per kW only if the bill context mentions demand.
List the sources you relied on.

Respond ONLY with valid JSON (no markdown) matching this schema:
{schema}"#;

/// Instruction for compiling the final report.
pub const REPORT_PROMPT: &str = r#"Generate a concise energy analysis report.

Bill data: {bill}
Research data: {benchmark}

Compare the bill against the research data, list concrete savings
opportunities, and give ordered next steps.

Respond ONLY with valid JSON (no markdown) matching this schema:
{schema}"#;

/// Format the Extractor instruction.
pub fn format_extract_prompt() -> String {
    EXTRACT_PROMPT.replace("{schema}", &response_schema::<BillFacts>())
}

/// Format the Benchmarker instruction.
pub fn format_benchmark_prompt(query: &BenchmarkQuery) -> String {
    BENCHMARK_PROMPT
        .replace("{context}", &query.context)
        .replace("{schema}", &response_schema::<BenchmarkFacts>())
}

/// Format the Reporter instruction with both prior records as JSON context.
pub fn format_report_prompt(bill: &BillFacts, benchmark: &BenchmarkFacts) -> String {
    REPORT_PROMPT
        .replace("{bill}", &serde_json::to_string(bill).unwrap_or_default())
        .replace("{benchmark}", &serde_json::to_string(benchmark).unwrap_or_default())
        .replace("{schema}", &response_schema::<Report>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::query::derive_benchmark_query;
    use rust_decimal::Decimal;

    fn bill() -> BillFacts {
        BillFacts {
            total_cost: Decimal::new(18743, 2),
            usage: Decimal::from(1245),
            rate_per_kwh: Decimal::new(1506, 4),
            billing_period: "Nov 2024".to_string(),
            demand_kw: None,
            power_factor: None,
            unusual_charges: vec!["Late fee: $5.00".to_string()],
            insights: String::new(),
        }
    }

    #[test]
    fn test_extract_prompt_has_schema() {
        let prompt = format_extract_prompt();
        assert!(prompt.contains("\"ratePerKwh\""));
        assert!(!prompt.contains("{schema}"));
    }

    #[test]
    fn test_benchmark_prompt_has_context() {
        let query = derive_benchmark_query(&bill());
        let prompt = format_benchmark_prompt(&query);
        assert!(prompt.contains(&query.context));
        assert!(prompt.contains("\"averageRate\""));
    }

    #[test]
    fn test_report_prompt_embeds_records() {
        let prompt = format_report_prompt(&bill(), &BenchmarkFacts::conservative_default());
        assert!(prompt.contains("Late fee: $5.00"));
        assert!(prompt.contains("Monitor peak usage"));
        assert!(prompt.contains("\"nextSteps\""));
        assert!(!prompt.contains("{bill}"));
        assert!(!prompt.contains("{benchmark}"));
    }
}
