//! Analysis pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Extraction (bill document → bill facts)
//! - Benchmark query derivation
//! - Benchmarking with degraded-mode fallback
//! - Report compilation
//! - Response normalization and typed decoding shared by every stage

pub(crate) mod call;
pub mod benchmark;
pub mod decode;
pub mod extract;
pub mod normalize;
pub mod orchestrator;
pub mod prompts;
pub mod query;
pub mod report;
pub mod schema;

pub use benchmark::benchmark;
pub use decode::parse_response;
pub use extract::extract;
pub use normalize::normalize;
pub use orchestrator::{Pipeline, RunObserver};
pub use prompts::{
    format_benchmark_prompt, format_extract_prompt, format_report_prompt, BENCHMARK_PROMPT,
    EXTRACT_PROMPT, REPORT_PROMPT,
};
pub use query::{derive_benchmark_query, BenchmarkQuery};
pub use report::report;
pub use schema::response_schema;
