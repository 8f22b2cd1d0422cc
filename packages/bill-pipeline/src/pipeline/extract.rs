//! Extractor stage: bill document → `BillFacts`.

use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::pipeline::call::call_delegate;
use crate::pipeline::decode::parse_response;
use crate::pipeline::prompts::format_extract_prompt;
use crate::traits::delegate::{Delegate, DelegateRequest};
use crate::types::config::PipelineConfig;
use crate::types::document::RawDocument;
use crate::types::facts::BillFacts;
use crate::types::run::Stage;

/// Extract normalized bill facts from a document.
///
/// The document travels inline with the instruction. Anything that cannot be
/// turned into a valid `BillFacts` is an error; required fields are never
/// defaulted.
pub async fn extract<D>(
    delegate: &D,
    config: &PipelineConfig,
    doc: &RawDocument,
) -> Result<BillFacts, ExtractionError>
where
    D: Delegate + ?Sized,
{
    debug!(media_type = %doc.media_type(), bytes = doc.len(), "Extracting bill facts");

    let request = DelegateRequest::new(Stage::Extractor, &config.model, format_extract_prompt())
        .with_attachment(doc.clone())
        .with_max_tokens(config.max_tokens);

    let raw = call_delegate(delegate, request, config.call_timeout).await?;
    let facts: BillFacts = parse_response(&raw)?;

    info!(
        billing_period = %facts.billing_period,
        total_cost = %facts.total_cost,
        usage_kwh = %facts.usage,
        "Bill facts extracted"
    );

    Ok(facts)
}
