//! The terminal record of one orchestration run.

use crate::core::{Artifact, AuditReport, GradeResult, RevisionOutcome, RunStatus, StageName};
use crate::errors::ArtifactflowError;
use crate::validation::ValidationResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Wall-clock timing of a run, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    /// Total run time.
    pub total: u64,
    /// Accumulated time per stage, across retries and repeated calls.
    pub per_stage: BTreeMap<StageName, u64>,
}

impl Timing {
    /// Builds timing from the context's durations.
    #[must_use]
    pub fn from_durations(total: Duration, per_stage: &BTreeMap<StageName, Duration>) -> Self {
        Self {
            total: millis(total),
            per_stage: per_stage.iter().map(|(k, v)| (*k, millis(*v))).collect(),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Why a run failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunError {
    /// The stage that was active; `None` when the request was rejected
    /// before any stage ran.
    pub stage: Option<StageName>,
    /// Human-readable message.
    pub message: String,
}

impl From<&ArtifactflowError> for RunError {
    fn from(err: &ArtifactflowError) -> Self {
        Self {
            stage: err.failed_stage(),
            message: err.run_message(),
        }
    }
}

/// Questions the caller must answer before the run can proceed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clarification {
    /// The missing-information questions.
    pub questions: Vec<String>,
}

/// The result of one orchestration run.
///
/// A failed run never carries an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// The run id.
    pub run_id: String,
    /// Terminal status.
    pub status: RunStatus,
    /// When the run started (RFC 3339).
    pub started_at: String,
    /// The final artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Artifact>,
    /// The last grading result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_result: Option<GradeResult>,
    /// Revisions consumed by the quality loop.
    pub revision_count: u32,
    /// How the quality loop ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_outcome: Option<RevisionOutcome>,
    /// The last output validation, when a builder context existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
    /// Compliance audit findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditReport>,
    /// Timing.
    pub timing: Timing,
    /// Failure details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RunError>,
    /// Clarification questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarification: Option<Clarification>,
}

impl RunResult {
    fn empty(run_id: String, status: RunStatus, started_at: String, timing: Timing) -> Self {
        Self {
            run_id,
            status,
            started_at,
            artifact: None,
            grade_result: None,
            revision_count: 0,
            revision_outcome: None,
            validation: None,
            audit: None,
            timing,
            error: None,
            clarification: None,
        }
    }

    /// Creates a failed result.
    #[must_use]
    pub fn failed(
        run_id: impl Into<String>,
        started_at: impl Into<String>,
        timing: Timing,
        error: RunError,
    ) -> Self {
        Self {
            error: Some(error),
            ..Self::empty(run_id.into(), RunStatus::Failed, started_at.into(), timing)
        }
    }

    /// Creates a clarification result.
    #[must_use]
    pub fn needs_clarification(
        run_id: impl Into<String>,
        started_at: impl Into<String>,
        timing: Timing,
        questions: Vec<String>,
    ) -> Self {
        Self {
            clarification: Some(Clarification { questions }),
            ..Self::empty(
                run_id.into(),
                RunStatus::NeedsClarification,
                started_at.into(),
                timing,
            )
        }
    }

    /// Creates a completed result with the final artifact.
    #[must_use]
    pub fn completed(
        run_id: impl Into<String>,
        started_at: impl Into<String>,
        timing: Timing,
        artifact: Artifact,
    ) -> Self {
        Self {
            artifact: Some(artifact),
            ..Self::empty(run_id.into(), RunStatus::Completed, started_at.into(), timing)
        }
    }

    /// Returns true if the run completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// Returns the must-fix items left unresolved by the quality loop.
    #[must_use]
    pub fn unresolved_fixes(&self) -> &[String] {
        match &self.grade_result {
            Some(grade) if !grade.passed => &grade.must_fix,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{RequestValidationError, StageError};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_timing_from_durations() {
        let mut per_stage = BTreeMap::new();
        per_stage.insert(StageName::QualityGrading, Duration::from_millis(1500));
        let timing = Timing::from_durations(Duration::from_millis(4200), &per_stage);

        assert_eq!(timing.total, 4200);
        assert_eq!(timing.per_stage[&StageName::QualityGrading], 1500);
    }

    #[test]
    fn test_failed_result_serialization() {
        let err = ArtifactflowError::stage(StageName::ArtifactBuilding, StageError::new("boom"));
        let result = RunResult::failed(
            "run-1",
            "2026-01-01T00:00:00.000000+00:00",
            Timing::default(),
            RunError::from(&err),
        );
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["runId"], "run-1");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"]["stage"], "artifact-building");
        assert_eq!(json["error"]["message"], "boom");
        assert!(json.get("artifact").is_none());
        assert_eq!(json["timing"]["total"], 0);
        assert!(json["timing"].get("perStage").is_some());
    }

    #[test]
    fn test_request_failure_has_no_stage() {
        let err = ArtifactflowError::from(RequestValidationError::EmptySource);
        let result = RunResult::failed("run-1", "now", Timing::default(), RunError::from(&err));
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["error"]["stage"].is_null());
    }

    #[test]
    fn test_clarification_result() {
        let result = RunResult::needs_clarification(
            "run-2",
            "now",
            Timing::default(),
            vec!["Which unit system?".to_string()],
        );
        assert_eq!(result.status, RunStatus::NeedsClarification);
        assert!(result.artifact.is_none());
        assert_eq!(result.clarification.unwrap().questions.len(), 1);
    }

    #[test]
    fn test_unresolved_fixes() {
        let mut result = RunResult::completed("run-3", "now", Timing::default(), Artifact::new("x"));
        assert!(result.unresolved_fixes().is_empty());

        result.grade_result = Some(GradeResult::fail(0.4, vec!["Add units".to_string()]));
        assert_eq!(result.unresolved_fixes(), ["Add units".to_string()]);

        result.grade_result = Some(GradeResult::pass(0.9));
        assert!(result.unresolved_fixes().is_empty());
    }
}
