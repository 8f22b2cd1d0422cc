//! Decode delegate text into validated stage records.

use serde::de::DeserializeOwned;

use crate::error::{DecodeError, ParseFailure, SchemaViolation};
use crate::pipeline::normalize::normalize;
use crate::types::facts::Validate;

/// Normalize, parse, deserialize, and validate a delegate response.
///
/// Undecodable text is a [`ParseFailure`]. JSON that does not fit `T`, or
/// that fails `T`'s semantic checks, is a [`SchemaViolation`].
pub fn parse_response<T>(raw: &str) -> Result<T, DecodeError>
where
    T: DeserializeOwned + Validate,
{
    let normalized = normalize(raw);

    let value: serde_json::Value =
        serde_json::from_str(&normalized).map_err(|e| ParseFailure::new(e.to_string()))?;

    let record: T =
        serde_json::from_value(value).map_err(|e| SchemaViolation::new(e.to_string()))?;

    record.validate()?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::facts::{BenchmarkFacts, BillFacts, Report};
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_fenced_bill() {
        let raw = "```json\n{\"totalCost\": 187.43, \"usage\": 1245, \"ratePerKwh\": 0.1506, \"billingPeriod\": \"Nov 2024\", \"unusualCharges\": [], \"insights\": \"\"}\n```";
        let facts: BillFacts = parse_response(raw).unwrap();
        assert_eq!(facts.total_cost, Decimal::new(18743, 2));
    }

    #[test]
    fn test_prose_is_parse_failure() {
        let err = parse_response::<BenchmarkFacts>("I was unable to find current rates.").unwrap_err();
        assert!(matches!(err, DecodeError::Parse(_)));
    }

    #[test]
    fn test_wrong_shape_is_schema_violation() {
        let err = parse_response::<BillFacts>(r#"["not", "an", "object"]"#).unwrap_err();
        assert!(matches!(err, DecodeError::Schema(_)));

        let err = parse_response::<BillFacts>(
            r#"{"totalCost": "a lot", "usage": 1, "ratePerKwh": 0.1, "billingPeriod": "x"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::Schema(_)));
    }

    #[test]
    fn test_negative_is_schema_violation() {
        let err = parse_response::<BillFacts>(
            r#"{"totalCost": -5, "usage": 1, "ratePerKwh": 0.1, "billingPeriod": "x", "unusualCharges": [], "insights": ""}"#,
        )
        .unwrap_err();
        match err {
            DecodeError::Schema(violation) => assert!(violation.message.contains("totalCost")),
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_next_steps() {
        let err = parse_response::<Report>(
            r#"{"summary": "High usage", "comparison": "Above average", "savings": ["LED lighting"]}"#,
        )
        .unwrap_err();
        match err {
            DecodeError::Schema(violation) => assert!(violation.message.contains("nextSteps")),
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    proptest! {
        #[test]
        fn prop_negative_usage_rejected(cents in 1i64..100_000_000) {
            let raw = format!(
                r#"{{"totalCost": 10, "usage": -{}.{:02}, "ratePerKwh": 0.1, "billingPeriod": "x", "unusualCharges": [], "insights": ""}}"#,
                cents / 100,
                cents % 100
            );
            let err = parse_response::<BillFacts>(&raw).unwrap_err();
            prop_assert!(matches!(err, DecodeError::Schema(_)));
        }

        #[test]
        fn prop_non_negative_rate_accepted(rate in 0u32..1_000_000) {
            let raw = format!(
                r#"{{"averageRate": 0.{:06}, "typicalUsage": "x", "recommendations": [], "sources": []}}"#,
                rate
            );
            let facts = parse_response::<BenchmarkFacts>(&raw).unwrap();
            prop_assert!(facts.average_rate >= Decimal::ZERO);
        }
    }
}
