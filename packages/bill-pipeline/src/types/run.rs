//! Per-invocation run record and the orchestrator state machine.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::PipelineFailure;
use crate::types::facts::{BenchmarkFacts, BillFacts, Report};

/// One of the three pipeline steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extractor,
    Benchmarker,
    Reporter,
}

impl Stage {
    /// Stages in execution order.
    pub const ALL: [Stage; 3] = [Stage::Extractor, Stage::Benchmarker, Stage::Reporter];

    /// Display name of the agent behind this stage.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Extractor => "Bill Analyzer",
            Self::Benchmarker => "Web Researcher",
            Self::Reporter => "Report Generator",
        }
    }

    /// One-line description for UIs.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Extractor => "Extracts costs, usage, and rates from the bill",
            Self::Benchmarker => "Finds industry benchmarks and trends",
            Self::Reporter => "Compiles insights into an actionable report",
        }
    }

    /// 1-based position in the pipeline.
    pub fn ordinal(&self) -> usize {
        match self {
            Self::Extractor => 1,
            Self::Benchmarker => 2,
            Self::Reporter => 3,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Extractor => "extractor",
            Self::Benchmarker => "benchmarker",
            Self::Reporter => "reporter",
        })
    }
}

/// Orchestrator state.
///
/// ```text
/// Idle → ExtractingBill → Benchmarking → Reporting → Complete
///   ╲          ╲                ╲             ╲
///    ╰──────────┴────────────────┴─────────────┴──→ Failed(stage)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "stage", rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    ExtractingBill,
    Benchmarking,
    Reporting,
    Complete,
    Failed(Stage),
}

impl PipelineState {
    /// `Complete` and `Failed` absorb.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed(_))
    }

    /// Stage currently executing, if any.
    pub fn active_stage(&self) -> Option<Stage> {
        match self {
            Self::ExtractingBill => Some(Stage::Extractor),
            Self::Benchmarking => Some(Stage::Benchmarker),
            Self::Reporting => Some(Stage::Reporter),
            _ => None,
        }
    }

    /// State entered when `stage` starts.
    pub fn running(stage: Stage) -> Self {
        match stage {
            Stage::Extractor => Self::ExtractingBill,
            Stage::Benchmarker => Self::Benchmarking,
            Stage::Reporter => Self::Reporting,
        }
    }

    /// Legal edges of the state machine.
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        match (*self, next) {
            (Self::Idle, Self::ExtractingBill)
            | (Self::ExtractingBill, Self::Benchmarking)
            | (Self::Benchmarking, Self::Reporting)
            | (Self::Reporting, Self::Complete) => true,
            // Cancelled before the first call went out.
            (Self::Idle, Self::Failed(Stage::Extractor)) => true,
            (from, Self::Failed(stage)) => from.active_stage() == Some(stage),
            _ => false,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::ExtractingBill => f.write_str("extracting bill"),
            Self::Benchmarking => f.write_str("benchmarking"),
            Self::Reporting => f.write_str("reporting"),
            Self::Complete => f.write_str("complete"),
            Self::Failed(stage) => write!(f, "failed ({})", stage),
        }
    }
}

/// Benchmarker result plus whether it came from the fallback record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BenchmarkOutcome {
    pub facts: BenchmarkFacts,
    pub degraded: bool,
}

impl BenchmarkOutcome {
    /// Facts taken from the delegate's response.
    pub fn live(facts: BenchmarkFacts) -> Self {
        Self {
            facts,
            degraded: false,
        }
    }

    /// Facts substituted from the fallback record.
    pub fn degraded(facts: BenchmarkFacts) -> Self {
        Self {
            facts,
            degraded: true,
        }
    }
}

/// Record of one pipeline invocation.
///
/// Owned by the orchestrator while it runs, then handed to the caller.
/// Later-stage fields are only populated once every earlier stage succeeded;
/// on failure, everything completed so far is kept.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    id: Uuid,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    state: PipelineState,
    bill_facts: Option<BillFacts>,
    benchmark_facts: Option<BenchmarkFacts>,
    benchmark_degraded: bool,
    report: Option<Report>,
    failure: Option<PipelineFailure>,
}

impl PipelineRun {
    /// A fresh run in the `Idle` state.
    pub fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            started_at: Utc::now(),
            finished_at: None,
            state: PipelineState::Idle,
            bill_facts: None,
            benchmark_facts: None,
            benchmark_degraded: false,
            report: None,
            failure: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn bill_facts(&self) -> Option<&BillFacts> {
        self.bill_facts.as_ref()
    }

    pub fn benchmark_facts(&self) -> Option<&BenchmarkFacts> {
        self.benchmark_facts.as_ref()
    }

    /// True when the benchmark facts are the fallback record.
    pub fn is_benchmark_degraded(&self) -> bool {
        self.benchmark_degraded
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// Terminal error of the first stage that failed.
    pub fn failure(&self) -> Option<&PipelineFailure> {
        self.failure.as_ref()
    }

    pub fn failed_stage(&self) -> Option<Stage> {
        match self.state {
            PipelineState::Failed(stage) => Some(stage),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == PipelineState::Complete
    }

    /// Stages whose output is stored in this run.
    pub fn completed_stages(&self) -> Vec<Stage> {
        let mut stages = Vec::with_capacity(3);
        if self.bill_facts.is_some() {
            stages.push(Stage::Extractor);
        }
        if self.benchmark_facts.is_some() {
            stages.push(Stage::Benchmarker);
        }
        if self.report.is_some() {
            stages.push(Stage::Reporter);
        }
        stages
    }

    // =========================================================================
    // Orchestrator-only mutation
    // =========================================================================

    pub(crate) fn transition(&mut self, next: PipelineState) {
        let legal = self.state.can_transition_to(next);
        debug_assert!(legal, "illegal transition {} -> {}", self.state, next);
        if !legal {
            error!(run_id = %self.id, from = %self.state, to = %next, "Illegal pipeline transition");
            return;
        }
        debug!(run_id = %self.id, from = %self.state, to = %next, "Pipeline transition");
        self.state = next;
        if next.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
    }

    pub(crate) fn record_bill_facts(&mut self, facts: BillFacts) {
        debug_assert_eq!(self.state, PipelineState::ExtractingBill);
        self.bill_facts = Some(facts);
    }

    pub(crate) fn record_benchmark(&mut self, outcome: BenchmarkOutcome) {
        debug_assert!(self.bill_facts.is_some());
        self.benchmark_degraded = outcome.degraded;
        self.benchmark_facts = Some(outcome.facts);
    }

    pub(crate) fn record_report(&mut self, report: Report) {
        debug_assert!(self.bill_facts.is_some() && self.benchmark_facts.is_some());
        self.report = Some(report);
    }

    pub(crate) fn fail(&mut self, failure: PipelineFailure) {
        let stage = failure.stage();
        self.failure = Some(failure);
        self.transition(PipelineState::Failed(stage));
    }
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ReportError, SchemaViolation};
    use rust_decimal::Decimal;

    fn bill() -> BillFacts {
        BillFacts {
            total_cost: Decimal::new(5000, 2),
            usage: Decimal::from(300),
            rate_per_kwh: Decimal::new(16, 2),
            billing_period: "Jan 2025".to_string(),
            demand_kw: None,
            power_factor: None,
            unusual_charges: vec![],
            insights: String::new(),
        }
    }

    #[test]
    fn test_happy_path_edges() {
        let path = [
            PipelineState::Idle,
            PipelineState::ExtractingBill,
            PipelineState::Benchmarking,
            PipelineState::Reporting,
            PipelineState::Complete,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_failed_only_from_active_stage() {
        assert!(PipelineState::Benchmarking.can_transition_to(PipelineState::Failed(Stage::Benchmarker)));
        assert!(!PipelineState::Benchmarking.can_transition_to(PipelineState::Failed(Stage::Reporter)));
        assert!(PipelineState::Idle.can_transition_to(PipelineState::Failed(Stage::Extractor)));
        assert!(!PipelineState::Complete.can_transition_to(PipelineState::Failed(Stage::Reporter)));
    }

    #[test]
    fn test_terminal_states_absorb() {
        for stage in Stage::ALL {
            let failed = PipelineState::Failed(stage);
            assert!(failed.is_terminal());
            assert!(!failed.can_transition_to(PipelineState::ExtractingBill));
        }
        assert!(!PipelineState::Complete.can_transition_to(PipelineState::Idle));
    }

    #[test]
    fn test_no_skipping_stages() {
        assert!(!PipelineState::Idle.can_transition_to(PipelineState::Benchmarking));
        assert!(!PipelineState::ExtractingBill.can_transition_to(PipelineState::Reporting));
        assert!(!PipelineState::Benchmarking.can_transition_to(PipelineState::Complete));
    }

    #[test]
    fn test_fail_keeps_completed_outputs() {
        let mut run = PipelineRun::new();
        run.transition(PipelineState::ExtractingBill);
        run.record_bill_facts(bill());
        run.transition(PipelineState::Benchmarking);
        run.record_benchmark(BenchmarkOutcome::degraded(BenchmarkFacts::conservative_default()));
        run.transition(PipelineState::Reporting);
        run.fail(ReportError::SchemaViolation(SchemaViolation::new("missing field `nextSteps`")).into());

        assert_eq!(run.state(), PipelineState::Failed(Stage::Reporter));
        assert_eq!(run.failed_stage(), Some(Stage::Reporter));
        assert!(run.bill_facts().is_some());
        assert!(run.benchmark_facts().is_some());
        assert!(run.is_benchmark_degraded());
        assert!(run.report().is_none());
        assert!(run.finished_at().is_some());
        assert_eq!(run.completed_stages(), vec![Stage::Extractor, Stage::Benchmarker]);
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_value(PipelineState::Failed(Stage::Reporter)).unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["stage"], "reporter");

        let json = serde_json::to_value(PipelineState::Complete).unwrap();
        assert_eq!(json["state"], "complete");
    }

    #[test]
    fn test_stage_metadata() {
        assert_eq!(Stage::ALL.map(|s| s.ordinal()), [1, 2, 3]);
        assert_eq!(Stage::Benchmarker.title(), "Web Researcher");
        assert_eq!(PipelineState::running(Stage::Reporter), PipelineState::Reporting);
    }
}
