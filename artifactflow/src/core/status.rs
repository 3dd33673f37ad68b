//! Stage names and run status enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of stages the orchestrator knows how to sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageName {
    /// Condenses oversized structured source material.
    SourceSummarization,
    /// Analyzes structured source material and extracts the builder context.
    SourceAnalysis,
    /// Designs a specification from the source analysis.
    ToolDesign,
    /// Extracts a specification from a free-form request.
    SpecificationExtraction,
    /// Profiles the intended audience.
    AudienceProfiling,
    /// Generates worked examples.
    ExampleGeneration,
    /// Generates interface microcopy.
    CopyGeneration,
    /// Selects a presentation template.
    TemplateSelection,
    /// Builds the artifact.
    ArtifactBuilding,
    /// Audits the artifact for compliance issues.
    ComplianceAuditing,
    /// Grades the artifact against the quality bar.
    QualityGrading,
    /// Revises the artifact from grading feedback.
    FeedbackRevision,
}

impl StageName {
    /// Every stage, in control-flow order.
    pub const ALL: [Self; 12] = [
        Self::SourceSummarization,
        Self::SourceAnalysis,
        Self::ToolDesign,
        Self::SpecificationExtraction,
        Self::AudienceProfiling,
        Self::ExampleGeneration,
        Self::CopyGeneration,
        Self::TemplateSelection,
        Self::ArtifactBuilding,
        Self::ComplianceAuditing,
        Self::QualityGrading,
        Self::FeedbackRevision,
    ];

    /// Returns the wire name of the stage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SourceSummarization => "source-summarization",
            Self::SourceAnalysis => "source-analysis",
            Self::ToolDesign => "tool-design",
            Self::SpecificationExtraction => "specification-extraction",
            Self::AudienceProfiling => "audience-profiling",
            Self::ExampleGeneration => "example-generation",
            Self::CopyGeneration => "copy-generation",
            Self::TemplateSelection => "template-selection",
            Self::ArtifactBuilding => "artifact-building",
            Self::ComplianceAuditing => "compliance-auditing",
            Self::QualityGrading => "quality-grading",
            Self::FeedbackRevision => "feedback-revision",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal status of an orchestration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The run produced an artifact.
    Completed,
    /// Specification extraction needs more information from the caller.
    NeedsClarification,
    /// The run failed on validation, infrastructure or a stage error.
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::NeedsClarification => write!(f, "needs_clarification"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// How the quality-revision loop terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionOutcome {
    /// The last grading passed.
    Passed,
    /// The revision budget ran out before a grading passed.
    BudgetExhausted,
}

impl RevisionOutcome {
    /// Returns true if the loop ended on a passing grade.
    #[must_use]
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_name_display_matches_serde() {
        for stage in StageName::ALL {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{stage}\""));
        }
    }

    #[test]
    fn test_stage_name_deserialize() {
        let stage: StageName = serde_json::from_str(r#""quality-grading""#).unwrap();
        assert_eq!(stage, StageName::QualityGrading);
    }

    #[test]
    fn test_run_status_serialize() {
        let json = serde_json::to_string(&RunStatus::NeedsClarification).unwrap();
        assert_eq!(json, r#""needs_clarification""#);
        assert_eq!(RunStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_revision_outcome() {
        assert!(RevisionOutcome::Passed.is_passed());
        assert!(!RevisionOutcome::BudgetExhausted.is_passed());
        let json = serde_json::to_string(&RevisionOutcome::BudgetExhausted).unwrap();
        assert_eq!(json, r#""budget_exhausted""#);
    }
}
