//! Energy Bill Analysis Pipeline
//!
//! Turns a utility bill (PDF or photo) into a structured analysis report in
//! three delegated stages:
//!
//! 1. **Extractor** reads the bill into [`BillFacts`]
//! 2. **Benchmarker** finds comparison figures ([`BenchmarkFacts`])
//! 3. **Reporter** compiles both into a [`Report`]
//!
//! # Design Philosophy
//!
//! **"Trust nothing the model says until it validates"**
//!
//! - The model does the semantic work; the library owns the contract
//! - Every response is normalized, decoded, and validated into a typed record
//! - Required fields are never invented; optional ones default explicitly
//! - Benchmarks are advisory and may degrade to a configured fallback
//! - Every failure is typed, tagged with its stage, and kept in the run
//!
//! # Usage
//!
//! ```rust,ignore
//! use bill_pipeline::{Pipeline, PipelineConfig, RawDocument};
//! use bill_pipeline::testing::ScriptedDelegate;
//!
//! let pipeline = Pipeline::new(ScriptedDelegate::happy_path())
//!     .with_config(PipelineConfig::default());
//!
//! let doc = RawDocument::load("bill.pdf", None).await?;
//! let run = pipeline.run(&doc).await;
//!
//! match run.report() {
//!     Some(report) => println!("{}", report.summary),
//!     None => eprintln!("failed: {:?}", run.failure()),
//! }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - The delegate seam
//! - [`types`] - Documents, stage records, run record, configuration
//! - [`pipeline`] - Stages, normalization, decoding, orchestration
//! - [`security`] - Credential handling
//! - [`testing`] - Scripted delegate and fixtures for testing

pub mod ai;
pub mod error;
pub mod pipeline;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{
    BenchmarkError, DecodeError, DocumentError, ErrorCause, ExtractionError, ParseFailure,
    PipelineFailure, ReportError, SchemaViolation, UpstreamFailure,
};
pub use security::{DelegateCredentials, SecretString};
pub use traits::delegate::{Delegate, DelegateRequest};
pub use types::{
    config::{PipelineConfig, DEFAULT_MODEL},
    document::{MediaType, RawDocument},
    facts::{BenchmarkFacts, BillFacts, Report, Validate},
    run::{BenchmarkOutcome, PipelineRun, PipelineState, Stage},
};

// Re-export pipeline components
pub use pipeline::{
    // Orchestration
    Pipeline, RunObserver,
    // Stages
    benchmark, extract, report,
    // Shared machinery
    derive_benchmark_query, normalize, parse_response, response_schema, BenchmarkQuery,
};

#[cfg(feature = "anthropic")]
pub use ai::AnthropicDelegate;

// Re-export testing utilities
pub use testing::{MockResponse, ScriptedDelegate};
