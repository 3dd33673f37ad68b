//! Stage input and output sum types.
//!
//! Every stage has exactly one input variant and one output variant. The
//! executor dispatches on [`StageInput::stage_name`] and rejects any output
//! whose [`StageOutput::stage_name`] differs, so the orchestrator can unwrap
//! outputs with the typed `into_*` accessors.

use super::payloads::{
    AnalysisRequest, AudienceProfile, AuditReport, BuildRequest, ExtractionOutcome,
    ExtractionRequest, GradeRequest, GradeResult, Microcopy, RevisionRequest, SourceAnalysis,
    SourceSummary, Specification, TemplateChoice, WorkedExample,
};
use super::{Artifact, StageName};
use crate::errors::ArtifactflowError;
use serde::{Deserialize, Serialize};

/// Input handed to a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "input", rename_all = "kebab-case")]
pub enum StageInput {
    /// Oversized structured source text.
    SourceSummarization(String),
    /// Structured source material to analyze.
    SourceAnalysis(AnalysisRequest),
    /// The analysis to design from.
    ToolDesign(SourceAnalysis),
    /// A free-form request.
    SpecificationExtraction(ExtractionRequest),
    /// The base specification.
    AudienceProfiling(Specification),
    /// The base specification.
    ExampleGeneration(Specification),
    /// The base specification.
    CopyGeneration(Specification),
    /// The enriched specification.
    TemplateSelection(Specification),
    /// What to build, plus corrective directives.
    ArtifactBuilding(BuildRequest),
    /// The artifact to audit.
    ComplianceAuditing(Artifact),
    /// The artifact to grade.
    QualityGrading(GradeRequest),
    /// The artifact to revise and the fixes to apply.
    FeedbackRevision(RevisionRequest),
}

impl StageInput {
    /// Returns the stage this input is addressed to.
    #[must_use]
    pub fn stage_name(&self) -> StageName {
        match self {
            Self::SourceSummarization(_) => StageName::SourceSummarization,
            Self::SourceAnalysis(_) => StageName::SourceAnalysis,
            Self::ToolDesign(_) => StageName::ToolDesign,
            Self::SpecificationExtraction(_) => StageName::SpecificationExtraction,
            Self::AudienceProfiling(_) => StageName::AudienceProfiling,
            Self::ExampleGeneration(_) => StageName::ExampleGeneration,
            Self::CopyGeneration(_) => StageName::CopyGeneration,
            Self::TemplateSelection(_) => StageName::TemplateSelection,
            Self::ArtifactBuilding(_) => StageName::ArtifactBuilding,
            Self::ComplianceAuditing(_) => StageName::ComplianceAuditing,
            Self::QualityGrading(_) => StageName::QualityGrading,
            Self::FeedbackRevision(_) => StageName::FeedbackRevision,
        }
    }
}

/// Output returned by a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "output", rename_all = "kebab-case")]
pub enum StageOutput {
    /// Condensed source material.
    SourceSummarization(SourceSummary),
    /// Analysis with an optional builder context.
    SourceAnalysis(SourceAnalysis),
    /// The designed specification.
    ToolDesign(Specification),
    /// Extracted specification or clarification questions.
    SpecificationExtraction(ExtractionOutcome),
    /// Audience profile.
    AudienceProfiling(AudienceProfile),
    /// Worked examples.
    ExampleGeneration(Vec<WorkedExample>),
    /// Interface copy.
    CopyGeneration(Microcopy),
    /// Chosen template.
    TemplateSelection(TemplateChoice),
    /// The built artifact.
    ArtifactBuilding(Artifact),
    /// Audit findings.
    ComplianceAuditing(AuditReport),
    /// Grading verdict.
    QualityGrading(GradeResult),
    /// The revised artifact.
    FeedbackRevision(Artifact),
}

impl StageOutput {
    /// Returns the stage this output belongs to.
    #[must_use]
    pub fn stage_name(&self) -> StageName {
        match self {
            Self::SourceSummarization(_) => StageName::SourceSummarization,
            Self::SourceAnalysis(_) => StageName::SourceAnalysis,
            Self::ToolDesign(_) => StageName::ToolDesign,
            Self::SpecificationExtraction(_) => StageName::SpecificationExtraction,
            Self::AudienceProfiling(_) => StageName::AudienceProfiling,
            Self::ExampleGeneration(_) => StageName::ExampleGeneration,
            Self::CopyGeneration(_) => StageName::CopyGeneration,
            Self::TemplateSelection(_) => StageName::TemplateSelection,
            Self::ArtifactBuilding(_) => StageName::ArtifactBuilding,
            Self::ComplianceAuditing(_) => StageName::ComplianceAuditing,
            Self::QualityGrading(_) => StageName::QualityGrading,
            Self::FeedbackRevision(_) => StageName::FeedbackRevision,
        }
    }

    /// A one-line description used in log events.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::SourceSummarization(s) => {
                format!("summarized {} chars to {}", s.original_chars, s.text.chars().count())
            }
            Self::SourceAnalysis(a) => match &a.builder_context {
                Some(ctx) => format!(
                    "builder context with {} framework items, {} terms",
                    ctx.framework_items.len(),
                    ctx.terminology.len()
                ),
                None => "no builder context".to_string(),
            },
            Self::ToolDesign(spec) => format!("designed '{}'", spec.title),
            Self::SpecificationExtraction(ExtractionOutcome::Ready { specification }) => {
                format!("extracted '{}'", specification.title)
            }
            Self::SpecificationExtraction(ExtractionOutcome::NeedsClarification { questions }) => {
                format!("needs clarification ({} questions)", questions.len())
            }
            Self::AudienceProfiling(p) => format!("audience: {}", p.persona),
            Self::ExampleGeneration(examples) => format!("{} examples", examples.len()),
            Self::CopyGeneration(copy) => format!("{} labels", copy.labels.len()),
            Self::TemplateSelection(t) => format!("template {}", t.template_id),
            Self::ArtifactBuilding(a) | Self::FeedbackRevision(a) => {
                format!("artifact {} ({} chars)", a.id, a.char_len())
            }
            Self::ComplianceAuditing(r) => format!(
                "{} findings, {} violations",
                r.findings.len(),
                r.violation_count()
            ),
            Self::QualityGrading(g) => format!(
                "score {:.2} ({}), {} must-fix",
                g.score,
                if g.passed { "passed" } else { "failed" },
                g.must_fix.len()
            ),
        }
    }

    fn mismatch(&self, expected: StageName) -> ArtifactflowError {
        ArtifactflowError::UnexpectedOutput {
            stage: expected,
            actual: self.stage_name(),
        }
    }

    /// Unwraps a source summary.
    pub fn into_source_summary(self) -> Result<SourceSummary, ArtifactflowError> {
        match self {
            Self::SourceSummarization(v) => Ok(v),
            other => Err(other.mismatch(StageName::SourceSummarization)),
        }
    }

    /// Unwraps a source analysis.
    pub fn into_source_analysis(self) -> Result<SourceAnalysis, ArtifactflowError> {
        match self {
            Self::SourceAnalysis(v) => Ok(v),
            other => Err(other.mismatch(StageName::SourceAnalysis)),
        }
    }

    /// Unwraps a designed specification.
    pub fn into_design(self) -> Result<Specification, ArtifactflowError> {
        match self {
            Self::ToolDesign(v) => Ok(v),
            other => Err(other.mismatch(StageName::ToolDesign)),
        }
    }

    /// Unwraps an extraction outcome.
    pub fn into_extraction(self) -> Result<ExtractionOutcome, ArtifactflowError> {
        match self {
            Self::SpecificationExtraction(v) => Ok(v),
            other => Err(other.mismatch(StageName::SpecificationExtraction)),
        }
    }

    /// Unwraps an audience profile.
    pub fn into_audience(self) -> Result<AudienceProfile, ArtifactflowError> {
        match self {
            Self::AudienceProfiling(v) => Ok(v),
            other => Err(other.mismatch(StageName::AudienceProfiling)),
        }
    }

    /// Unwraps worked examples.
    pub fn into_examples(self) -> Result<Vec<WorkedExample>, ArtifactflowError> {
        match self {
            Self::ExampleGeneration(v) => Ok(v),
            other => Err(other.mismatch(StageName::ExampleGeneration)),
        }
    }

    /// Unwraps interface copy.
    pub fn into_microcopy(self) -> Result<Microcopy, ArtifactflowError> {
        match self {
            Self::CopyGeneration(v) => Ok(v),
            other => Err(other.mismatch(StageName::CopyGeneration)),
        }
    }

    /// Unwraps a template choice.
    pub fn into_template(self) -> Result<TemplateChoice, ArtifactflowError> {
        match self {
            Self::TemplateSelection(v) => Ok(v),
            other => Err(other.mismatch(StageName::TemplateSelection)),
        }
    }

    /// Unwraps a built artifact.
    pub fn into_built(self) -> Result<Artifact, ArtifactflowError> {
        match self {
            Self::ArtifactBuilding(v) => Ok(v),
            other => Err(other.mismatch(StageName::ArtifactBuilding)),
        }
    }

    /// Unwraps an audit report.
    pub fn into_audit(self) -> Result<AuditReport, ArtifactflowError> {
        match self {
            Self::ComplianceAuditing(v) => Ok(v),
            other => Err(other.mismatch(StageName::ComplianceAuditing)),
        }
    }

    /// Unwraps a grading verdict.
    pub fn into_grade(self) -> Result<GradeResult, ArtifactflowError> {
        match self {
            Self::QualityGrading(v) => Ok(v),
            other => Err(other.mismatch(StageName::QualityGrading)),
        }
    }

    /// Unwraps a revised artifact.
    pub fn into_revised(self) -> Result<Artifact, ArtifactflowError> {
        match self {
            Self::FeedbackRevision(v) => Ok(v),
            other => Err(other.mismatch(StageName::FeedbackRevision)),
        }
    }
}
