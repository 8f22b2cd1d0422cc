//! Benchmark query derivation.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Write as _;

use crate::types::facts::BillFacts;

/// Input to the Benchmarker, derived from `BillFacts`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkQuery {
    pub rate_per_kwh: Decimal,
    pub usage_kwh: Decimal,
    pub demand_kw: Option<Decimal>,
    pub billing_period: String,

    /// Natural-language context handed to the delegate
    pub context: String,
}

/// Build the benchmark query for a bill.
///
/// Pure: the same facts always give the same query, byte for byte. Numbers
/// are printed without trailing zeros so `0.1500` and `0.15` agree.
pub fn derive_benchmark_query(bill: &BillFacts) -> BenchmarkQuery {
    let rate = bill.rate_per_kwh.normalize();
    let usage = bill.usage.normalize();
    let demand = bill.demand_kw.map(|d| d.normalize());

    let mut context = format!("energy rate {} kWh industry benchmark", rate);
    let _ = write!(context, "; usage {} kWh", usage);
    if let Some(demand) = demand {
        let _ = write!(context, "; peak demand {} kW", demand);
    }
    let period = bill.billing_period.trim();
    if !period.is_empty() {
        let _ = write!(context, "; billing period {}", period);
    }

    BenchmarkQuery {
        rate_per_kwh: rate,
        usage_kwh: usage,
        demand_kw: demand,
        billing_period: period.to_string(),
        context,
    }
}
