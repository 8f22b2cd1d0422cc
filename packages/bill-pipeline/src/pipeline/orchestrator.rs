//! The Pipeline - sequences the three stages over one bill.
//!
//! Each invocation owns a fresh [`PipelineRun`]. Stages run strictly in
//! order; the first failure ends the run and nothing later is attempted.
//! The orchestrator holds no state between runs, so one `Pipeline` can drive
//! any number of runs concurrently.

use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

use crate::error::{ExtractionError, PipelineFailure, UpstreamFailure};
use crate::pipeline::benchmark::benchmark;
use crate::pipeline::extract::extract;
use crate::pipeline::query::derive_benchmark_query;
use crate::pipeline::report::report;
use crate::traits::delegate::Delegate;
use crate::types::config::PipelineConfig;
use crate::types::document::RawDocument;
use crate::types::run::{PipelineRun, PipelineState, Stage};

/// Receives the run after every state transition.
///
/// Called synchronously from the orchestrator; keep it quick.
pub trait RunObserver: Send + Sync {
    fn on_transition(&self, run: &PipelineRun);
}

impl<F> RunObserver for F
where
    F: Fn(&PipelineRun) + Send + Sync,
{
    fn on_transition(&self, run: &PipelineRun) {
        self(run)
    }
}

/// Three-stage bill analysis over a shared delegate.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = Pipeline::new(delegate).with_config(PipelineConfig::default());
///
/// let doc = RawDocument::load("bill.pdf", None).await?;
/// let run = pipeline.run(&doc).await;
///
/// if let Some(report) = run.report() {
///     println!("{}", report.summary);
/// }
/// ```
pub struct Pipeline<D: Delegate> {
    delegate: D,
    config: PipelineConfig,
}

impl<D: Delegate> Pipeline<D> {
    /// Create a pipeline with default configuration.
    pub fn new(delegate: D) -> Self {
        Self {
            delegate,
            config: PipelineConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    /// Analyze one bill.
    ///
    /// Never returns an error: failures are recorded in the returned run.
    pub async fn run(&self, doc: &RawDocument) -> PipelineRun {
        self.drive(doc, &|_: &PipelineRun| {}, None).await
    }

    /// Analyze one bill, reporting every transition to `observer`.
    pub async fn run_observed(&self, doc: &RawDocument, observer: &dyn RunObserver) -> PipelineRun {
        self.drive(doc, observer, None).await
    }

    /// Analyze one bill with cancellation support.
    ///
    /// Cancelling drops the in-flight delegate call; the run fails at the
    /// current stage with an upstream `Cancelled` failure.
    pub async fn run_with_cancel(
        &self,
        doc: &RawDocument,
        observer: &dyn RunObserver,
        cancel: CancellationToken,
    ) -> PipelineRun {
        self.drive(doc, observer, Some(&cancel)).await
    }

    async fn drive(
        &self,
        doc: &RawDocument,
        observer: &dyn RunObserver,
        cancel: Option<&CancellationToken>,
    ) -> PipelineRun {
        let mut run = PipelineRun::new();
        let span = info_span!("pipeline_run", run_id = %run.id());

        async {
            info!(
                media_type = %doc.media_type(),
                bytes = doc.len(),
                model = %self.config.model,
                "Pipeline run started"
            );

            if cancel.is_some_and(|token| token.is_cancelled()) {
                run.fail(ExtractionError::from(UpstreamFailure::Cancelled).into());
                observer.on_transition(&run);
                warn!("Pipeline run cancelled before start");
                return;
            }

            match self.stages(&mut run, doc, observer, cancel).await {
                Ok(()) => {
                    info!(
                        degraded = run.is_benchmark_degraded(),
                        "Pipeline run complete"
                    );
                }
                Err(failure) => {
                    warn!(
                        stage = %failure.stage(),
                        cause = %failure.cause(),
                        error = %failure,
                        "Pipeline run failed"
                    );
                    run.fail(failure);
                    observer.on_transition(&run);
                }
            }
        }
        .instrument(span)
        .await;

        run
    }

    async fn stages(
        &self,
        run: &mut PipelineRun,
        doc: &RawDocument,
        observer: &dyn RunObserver,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), PipelineFailure> {
        enter(run, observer, PipelineState::running(Stage::Extractor));
        let bill = cancellable(cancel, extract(&self.delegate, &self.config, doc)).await?;
        run.record_bill_facts(bill.clone());

        enter(run, observer, PipelineState::running(Stage::Benchmarker));
        let query = derive_benchmark_query(&bill);
        let outcome = cancellable(cancel, benchmark(&self.delegate, &self.config, &query)).await?;
        let bench = outcome.facts.clone();
        run.record_benchmark(outcome);

        enter(run, observer, PipelineState::running(Stage::Reporter));
        let report = cancellable(cancel, report(&self.delegate, &self.config, &bill, &bench)).await?;
        run.record_report(report);

        enter(run, observer, PipelineState::Complete);
        Ok(())
    }
}

fn enter(run: &mut PipelineRun, observer: &dyn RunObserver, next: PipelineState) {
    run.transition(next);
    observer.on_transition(run);
}

/// Race a stage against the cancellation token, if there is one.
async fn cancellable<T, E, F>(cancel: Option<&CancellationToken>, stage: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<UpstreamFailure>,
{
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(UpstreamFailure::Cancelled.into()),
            result = stage => result,
        },
        None => stage.await,
    }
}
