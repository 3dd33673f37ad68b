//! Mock stages and collaborators for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Notify;

use crate::context::PipelineContext;
use crate::core::{StageInput, StageName, StageOutput};
use crate::errors::{ScoreError, StageError};
use crate::stages::{QualityScore, QualityScorer, Stage};

type Scripted = Result<StageOutput, StageError>;

/// A stage that replays a script of results and records its inputs.
///
/// Results are handed out in order; once the script is down to its last
/// entry, that entry is repeated for every further call.
#[derive(Debug)]
pub struct ScriptedStage {
    name: StageName,
    script: Mutex<VecDeque<Scripted>>,
    inputs: Mutex<Vec<StageInput>>,
}

impl ScriptedStage {
    /// Creates a stage that always returns `output`.
    #[must_use]
    pub fn new(name: StageName, output: StageOutput) -> Self {
        Self::from_results(name, vec![Ok(output)])
    }

    /// Creates a stage from a full script.
    #[must_use]
    pub fn from_results(name: StageName, results: Vec<Scripted>) -> Self {
        Self {
            name,
            script: Mutex::new(results.into()),
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Appends an output to the script.
    #[must_use]
    pub fn then(self, output: StageOutput) -> Self {
        self.script.lock().push_back(Ok(output));
        self
    }

    /// Appends a failure to the script.
    #[must_use]
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.script.lock().push_back(Err(StageError::new(message)));
        self
    }

    /// Returns the number of times the stage was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inputs.lock().len()
    }

    /// Returns the inputs of every call, in order.
    #[must_use]
    pub fn recorded_inputs(&self) -> Vec<StageInput> {
        self.inputs.lock().clone()
    }

    fn next(&self) -> Scripted {
        let mut script = self.script.lock();
        if script.len() > 1 {
            script
                .pop_front()
                .unwrap_or_else(|| Err(StageError::new("script exhausted")))
        } else {
            script
                .front()
                .cloned()
                .unwrap_or_else(|| Err(StageError::new("script exhausted")))
        }
    }
}

#[async_trait]
impl Stage for ScriptedStage {
    fn name(&self) -> StageName {
        self.name
    }

    async fn execute(
        &self,
        input: StageInput,
        _ctx: &PipelineContext,
    ) -> Result<StageOutput, StageError> {
        self.inputs.lock().push(input);
        self.next()
    }
}

/// A stage that always fails with the same message.
#[derive(Debug)]
pub struct FailingStage {
    name: StageName,
    error: String,
    calls: Mutex<usize>,
}

impl FailingStage {
    /// Creates a failing stage.
    #[must_use]
    pub fn new(name: StageName, error: impl Into<String>) -> Self {
        Self {
            name,
            error: error.into(),
            calls: Mutex::new(0),
        }
    }

    /// Returns the number of attempts made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl Stage for FailingStage {
    fn name(&self) -> StageName {
        self.name
    }

    async fn execute(
        &self,
        _input: StageInput,
        _ctx: &PipelineContext,
    ) -> Result<StageOutput, StageError> {
        *self.calls.lock() += 1;
        Err(StageError::new(self.error.clone()))
    }
}

/// A stage that takes time before returning its output.
#[derive(Debug)]
pub struct SlowStage {
    name: StageName,
    delay: Duration,
    output: StageOutput,
}

impl SlowStage {
    /// Creates a slow stage.
    #[must_use]
    pub fn new(name: StageName, delay: Duration, output: StageOutput) -> Self {
        Self {
            name,
            delay,
            output,
        }
    }
}

#[async_trait]
impl Stage for SlowStage {
    fn name(&self) -> StageName {
        self.name
    }

    async fn execute(
        &self,
        _input: StageInput,
        _ctx: &PipelineContext,
    ) -> Result<StageOutput, StageError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.output.clone())
    }
}

/// A quality scorer that records what it was asked to score.
#[derive(Debug, Default)]
pub struct RecordingScorer {
    calls: Mutex<Vec<(String, String)>>,
    fail: bool,
    notify: Notify,
}

impl RecordingScorer {
    /// Creates a scorer that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scorer that records the call and then fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Returns `(run_id, artifact_id)` for every call.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }

    /// Waits until at least `count` calls were made.
    pub async fn wait_for_calls(&self, count: usize) {
        loop {
            if self.calls.lock().len() >= count {
                return;
            }
            self.notify.notified().await;
        }
    }
}

#[async_trait]
impl QualityScorer for RecordingScorer {
    async fn score(
        &self,
        run_id: &str,
        artifact_id: &str,
        artifact_text: &str,
    ) -> Result<QualityScore, ScoreError> {
        self.calls
            .lock()
            .push((run_id.to_string(), artifact_id.to_string()));
        self.notify.notify_one();
        if self.fail {
            return Err(ScoreError("scorer unavailable".to_string()));
        }
        #[allow(clippy::cast_precision_loss)]
        let score = (artifact_text.len() % 100) as f64 / 100.0;
        Ok(QualityScore {
            run_id: run_id.to_string(),
            artifact_id: artifact_id.to_string(),
            score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AuditReport, GradeResult};

    fn grade(passed: bool) -> StageOutput {
        StageOutput::QualityGrading(if passed {
            GradeResult::pass(0.9)
        } else {
            GradeResult::fail(0.3, vec!["Add units".to_string()])
        })
    }

    #[tokio::test]
    async fn test_scripted_stage_repeats_last_entry() {
        let stage = ScriptedStage::new(StageName::QualityGrading, grade(false)).then(grade(true));
        let ctx = PipelineContext::new("run-1");
        let input = StageInput::ComplianceAuditing(crate::core::Artifact::new("x"));

        let first = stage.execute(input.clone(), &ctx).await.unwrap();
        let second = stage.execute(input.clone(), &ctx).await.unwrap();
        let third = stage.execute(input, &ctx).await.unwrap();

        assert!(!first.into_grade().unwrap().passed);
        assert!(second.into_grade().unwrap().passed);
        assert!(third.into_grade().unwrap().passed);
        assert_eq!(stage.call_count(), 3);
    }

    #[tokio::test]
    async fn test_scripted_failure_then_success() {
        let stage = ScriptedStage::from_results(
            StageName::ComplianceAuditing,
            vec![Err(StageError::new("network blip"))],
        )
        .then(StageOutput::ComplianceAuditing(AuditReport::default()));
        let ctx = PipelineContext::new("run-1");
        let input = StageInput::ComplianceAuditing(crate::core::Artifact::new("x"));

        assert!(stage.execute(input.clone(), &ctx).await.is_err());
        assert!(stage.execute(input, &ctx).await.is_ok());
    }

    #[tokio::test]
    async fn test_failing_stage_counts_calls() {
        let stage = FailingStage::new(StageName::ToolDesign, "invalid spec");
        let ctx = PipelineContext::new("run-1");
        let input = StageInput::ComplianceAuditing(crate::core::Artifact::new("x"));

        let err = stage.execute(input, &ctx).await.unwrap_err();
        assert_eq!(err.message, "invalid spec");
        assert_eq!(stage.call_count(), 1);
    }

    #[tokio::test]
    async fn test_recording_scorer() {
        let scorer = RecordingScorer::failing();
        assert!(scorer.score("run-1", "art-1", "text").await.is_err());
        scorer.wait_for_calls(1).await;
        assert_eq!(scorer.calls(), vec![("run-1".to_string(), "art-1".to_string())]);
    }
}
