//! Run-scoped mutable state threaded through every stage call.

use crate::core::{StageName, StageOutput};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;

/// Default revision budget for the quality loop.
pub const DEFAULT_MAX_REVISIONS: u32 = 3;

/// The mutable context of one orchestration run.
///
/// A context is owned by exactly one in-flight run. Only the orchestrator
/// mutates it; stages receive a shared reference and may read earlier
/// stages' outputs.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    run_id: String,
    started_at: String,
    start: Instant,
    current_stage: Option<StageName>,
    stage_outputs: BTreeMap<StageName, StageOutput>,
    stage_durations: BTreeMap<StageName, Duration>,
    invocations: BTreeMap<StageName, u32>,
    revision_count: u32,
    max_revisions: u32,
}

impl PipelineContext {
    /// Creates a context for a run.
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: crate::utils::iso_timestamp(),
            start: Instant::now(),
            current_stage: None,
            stage_outputs: BTreeMap::new(),
            stage_durations: BTreeMap::new(),
            invocations: BTreeMap::new(),
            revision_count: 0,
            max_revisions: DEFAULT_MAX_REVISIONS,
        }
    }

    /// Sets the revision budget.
    #[must_use]
    pub fn with_max_revisions(mut self, max_revisions: u32) -> Self {
        self.max_revisions = max_revisions;
        self
    }

    /// Returns the run id.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Returns when the run started, as an RFC 3339 string.
    #[must_use]
    pub fn started_at(&self) -> &str {
        &self.started_at
    }

    /// Returns the time elapsed since the run started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Returns the stage currently (or most recently) executing.
    #[must_use]
    pub fn current_stage(&self) -> Option<StageName> {
        self.current_stage
    }

    /// Marks a stage as active and counts the invocation.
    pub fn enter_stage(&mut self, stage: StageName) {
        self.current_stage = Some(stage);
        *self.invocations.entry(stage).or_insert(0) += 1;
    }

    /// Stores a stage's output and adds the call's duration to its total.
    ///
    /// A later output of the same stage replaces the earlier one.
    pub fn record_output(&mut self, output: StageOutput, elapsed: Duration) {
        let stage = output.stage_name();
        self.record_duration(stage, elapsed);
        self.stage_outputs.insert(stage, output);
    }

    /// Adds time spent in a stage without storing an output.
    pub fn record_duration(&mut self, stage: StageName, elapsed: Duration) {
        *self.stage_durations.entry(stage).or_default() += elapsed;
    }

    /// Returns the latest output of a stage.
    #[must_use]
    pub fn output(&self, stage: StageName) -> Option<&StageOutput> {
        self.stage_outputs.get(&stage)
    }

    /// Returns all stored outputs.
    #[must_use]
    pub fn outputs(&self) -> &BTreeMap<StageName, StageOutput> {
        &self.stage_outputs
    }

    /// Returns the total time spent in a stage.
    #[must_use]
    pub fn duration(&self, stage: StageName) -> Option<Duration> {
        self.stage_durations.get(&stage).copied()
    }

    /// Returns total time per stage.
    #[must_use]
    pub fn stage_durations(&self) -> &BTreeMap<StageName, Duration> {
        &self.stage_durations
    }

    /// Returns how many times a stage was invoked.
    #[must_use]
    pub fn invocation_count(&self, stage: StageName) -> u32 {
        self.invocations.get(&stage).copied().unwrap_or(0)
    }

    /// Returns the number of stage invocations across all stages.
    #[must_use]
    pub fn total_invocations(&self) -> u32 {
        self.invocations.values().sum()
    }

    /// Returns the revision counter.
    #[must_use]
    pub fn revision_count(&self) -> u32 {
        self.revision_count
    }

    /// Returns the revision budget.
    #[must_use]
    pub fn max_revisions(&self) -> u32 {
        self.max_revisions
    }

    /// Counts one failed grading and returns the new count.
    pub fn increment_revision(&mut self) -> u32 {
        self.revision_count += 1;
        self.revision_count
    }

    /// Returns true once the revision budget is spent.
    #[must_use]
    pub fn revision_budget_exhausted(&self) -> bool {
        self.revision_count >= self.max_revisions
    }
}
