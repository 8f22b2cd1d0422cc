//! Stage output records: bill facts, benchmark facts, and the final report.
//!
//! Each record is deserialized straight from the delegate's JSON (camelCase
//! keys) and then checked with [`Validate`]. Defaulting rules per field:
//!
//! | record | field | when absent |
//! |---|---|---|
//! | `BillFacts` | `demandKw`, `powerFactor` | `None` |
//! | `BillFacts` | every other field | schema violation |
//! | `BenchmarkFacts` | `averageDemandCharge` | `None` |
//! | `BenchmarkFacts` | every other field | schema violation |
//! | `Report` | every field | schema violation |

use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SchemaViolation;

/// Semantic checks applied after a record deserializes.
pub trait Validate {
    fn validate(&self) -> Result<(), SchemaViolation>;
}

fn non_negative(field: &str, value: Decimal) -> Result<(), SchemaViolation> {
    if value < Decimal::ZERO {
        return Err(SchemaViolation::new(format!(
            "`{}` must be non-negative, got {}",
            field, value
        )));
    }
    Ok(())
}

fn non_negative_opt(field: &str, value: Option<Decimal>) -> Result<(), SchemaViolation> {
    match value {
        Some(value) => non_negative(field, value),
        None => Ok(()),
    }
}

/// Normalized facts read off a utility bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillFacts {
    /// Total amount due for the period
    #[schemars(with = "f64")]
    pub total_cost: Decimal,

    /// Energy consumed, in kWh
    #[schemars(with = "f64")]
    pub usage: Decimal,

    /// Effective rate per kWh
    #[schemars(with = "f64")]
    pub rate_per_kwh: Decimal,

    /// Billing period as printed on the bill (e.g. "Nov 2024")
    pub billing_period: String,

    /// Peak demand in kW (commercial and industrial bills)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<f64>")]
    pub demand_kw: Option<Decimal>,

    /// Power factor (industrial bills)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<f64>")]
    pub power_factor: Option<Decimal>,

    /// Fees or charges that stand out, in bill order
    pub unusual_charges: Vec<String>,

    /// Free-text observations about the bill
    pub insights: String,
}

impl Validate for BillFacts {
    fn validate(&self) -> Result<(), SchemaViolation> {
        non_negative("totalCost", self.total_cost)?;
        non_negative("usage", self.usage)?;
        non_negative("ratePerKwh", self.rate_per_kwh)?;
        non_negative_opt("demandKw", self.demand_kw)?;
        non_negative_opt("powerFactor", self.power_factor)?;

        if self.billing_period.trim().is_empty() {
            return Err(SchemaViolation::new("`billingPeriod` must not be empty"));
        }
        Ok(())
    }
}

/// Industry comparison figures for a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkFacts {
    /// Average rate per kWh for comparable customers
    #[schemars(with = "f64")]
    pub average_rate: Decimal,

    /// Average demand charge per kW, where demand billing applies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<f64>")]
    pub average_demand_charge: Option<Decimal>,

    /// Description of typical usage patterns
    pub typical_usage: String,

    /// Cost-saving recommendations, most relevant first
    pub recommendations: Vec<String>,

    /// Where the figures came from
    pub sources: Vec<String>,
}

impl BenchmarkFacts {
    /// Conservative record used when benchmark content is unusable.
    ///
    /// Figures are advisory placeholders; override them through
    /// [`PipelineConfig::with_benchmark_fallback`].
    ///
    /// [`PipelineConfig::with_benchmark_fallback`]: crate::types::config::PipelineConfig::with_benchmark_fallback
    pub fn conservative_default() -> Self {
        Self {
            average_rate: Decimal::new(13, 2),
            average_demand_charge: None,
            typical_usage: "Based on industry standards".to_string(),
            recommendations: vec![
                "Monitor peak usage".to_string(),
                "Consider energy-efficient appliances".to_string(),
            ],
            sources: vec!["Industry data".to_string()],
        }
    }
}

impl Validate for BenchmarkFacts {
    fn validate(&self) -> Result<(), SchemaViolation> {
        non_negative("averageRate", self.average_rate)?;
        non_negative_opt("averageDemandCharge", self.average_demand_charge)
    }
}

/// Narrative summary compiled from bill and benchmark facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Executive summary
    pub summary: String,

    /// How the bill compares with the benchmarks
    pub comparison: String,

    /// Potential savings, one per entry
    pub savings: Vec<String>,

    /// Recommended next steps, in order
    pub next_steps: Vec<String>,
}

impl Validate for Report {
    fn validate(&self) -> Result<(), SchemaViolation> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residential() -> BillFacts {
        BillFacts {
            total_cost: Decimal::new(18743, 2),
            usage: Decimal::from(1245),
            rate_per_kwh: Decimal::new(1506, 4),
            billing_period: "Nov 2024".to_string(),
            demand_kw: None,
            power_factor: None,
            unusual_charges: vec!["Late fee: $5.00".to_string()],
            insights: "Usage up 12% from last month".to_string(),
        }
    }

    #[test]
    fn test_bill_facts_from_numbers() {
        let json = r#"{
            "totalCost": 187.43,
            "usage": 1245,
            "ratePerKwh": 0.1506,
            "billingPeriod": "Nov 2024",
            "unusualCharges": ["Late fee: $5.00"],
            "insights": "Usage up 12% from last month"
        }"#;

        let facts: BillFacts = serde_json::from_str(json).unwrap();
        assert_eq!(facts, residential());
        assert!(facts.validate().is_ok());
    }

    #[test]
    fn test_demand_fields_optional() {
        let json = r#"{"totalCost": 10, "usage": 5, "ratePerKwh": 0.2, "billingPeriod": "Q1", "unusualCharges": [], "insights": ""}"#;
        let facts: BillFacts = serde_json::from_str(json).unwrap();
        assert!(facts.demand_kw.is_none());
        assert!(facts.power_factor.is_none());
    }

    #[test]
    fn test_missing_charges_and_insights_rejected() {
        let json = r#"{"totalCost": 187.43, "usage": 1245, "ratePerKwh": 0.1506, "billingPeriod": "Nov 2024"}"#;
        let err = serde_json::from_str::<BillFacts>(json).unwrap_err();
        assert!(err.to_string().contains("unusualCharges"));

        let json = r#"{"totalCost": 187.43, "usage": 1245, "ratePerKwh": 0.1506, "billingPeriod": "Nov 2024", "unusualCharges": []}"#;
        let err = serde_json::from_str::<BillFacts>(json).unwrap_err();
        assert!(err.to_string().contains("insights"));
    }

    #[test]
    fn test_benchmark_lists_required() {
        let json = r#"{"averageRate": 0.16, "typicalUsage": "x"}"#;
        let err = serde_json::from_str::<BenchmarkFacts>(json).unwrap_err();
        assert!(err.to_string().contains("recommendations"));

        let json = r#"{"averageRate": 0.16, "typicalUsage": "x", "recommendations": []}"#;
        let err = serde_json::from_str::<BenchmarkFacts>(json).unwrap_err();
        assert!(err.to_string().contains("sources"));
    }

    #[test]
    fn test_industrial_fields() {
        let json = r#"{
            "totalCost": 48210.55, "usage": 310000, "ratePerKwh": 0.0912,
            "billingPeriod": "Oct 2024", "demandKw": 820.5, "powerFactor": 0.87,
            "unusualCharges": [], "insights": ""
        }"#;
        let facts: BillFacts = serde_json::from_str(json).unwrap();
        assert_eq!(facts.demand_kw, Some(Decimal::new(8205, 1)));
        assert_eq!(facts.power_factor, Some(Decimal::new(87, 2)));
    }

    #[test]
    fn test_missing_rate_is_error() {
        let json = r#"{"totalCost": 10, "usage": 5, "billingPeriod": "Q1"}"#;
        let err = serde_json::from_str::<BillFacts>(json).unwrap_err();
        assert!(err.to_string().contains("ratePerKwh"));
    }

    #[test]
    fn test_negative_values_rejected() {
        let mut facts = residential();
        facts.usage = Decimal::new(-1, 0);
        let err = facts.validate().unwrap_err();
        assert!(err.message.contains("usage"));

        let mut facts = residential();
        facts.demand_kw = Some(Decimal::new(-5, 1));
        assert!(facts.validate().is_err());
    }

    #[test]
    fn test_blank_billing_period_rejected() {
        let mut facts = residential();
        facts.billing_period = "   ".to_string();
        assert!(facts.validate().is_err());
    }

    #[test]
    fn test_conservative_default_is_valid() {
        let fallback = BenchmarkFacts::conservative_default();
        assert!(fallback.validate().is_ok());
        assert_eq!(fallback.average_rate.to_string(), "0.13");
    }

    #[test]
    fn test_report_requires_next_steps() {
        let json = r#"{"summary": "s", "comparison": "c", "savings": []}"#;
        let err = serde_json::from_str::<Report>(json).unwrap_err();
        assert!(err.to_string().contains("nextSteps"));
    }
}
