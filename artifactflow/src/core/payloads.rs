//! Typed payloads exchanged between the orchestrator and its stages.

use super::Artifact;
use crate::validation::BuilderContext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One input control the generated tool exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecInput {
    /// Machine name of the input.
    pub name: String,
    /// Label shown to the user.
    pub label: String,
    /// Kind of control (e.g. "number", "select", "text").
    pub kind: String,
    /// Optional placeholder text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// The specification of the decision-support tool to build.
///
/// Extraction or design produces the base fields; the enrichment stages
/// fill in `audience`, `examples` and `microcopy`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specification {
    /// Title of the tool.
    pub title: String,
    /// What the tool does, in a sentence or two.
    pub summary: String,
    /// Kind of tool (calculator, checklist, scorecard, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_kind: Option<String>,
    /// Input controls.
    #[serde(default)]
    pub inputs: Vec<SpecInput>,
    /// Outputs the tool presents.
    #[serde(default)]
    pub outputs: Vec<String>,
    /// Functional requirements.
    #[serde(default)]
    pub requirements: Vec<String>,
    /// Audience profile, once enriched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<AudienceProfile>,
    /// Worked examples, once enriched.
    #[serde(default)]
    pub examples: Vec<WorkedExample>,
    /// Interface copy, once enriched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microcopy: Option<Microcopy>,
}

impl Specification {
    /// Creates a specification with a title and summary.
    #[must_use]
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            ..Self::default()
        }
    }

    /// Adds a requirement.
    #[must_use]
    pub fn with_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.requirements.push(requirement.into());
        self
    }

    /// Adds an input control.
    #[must_use]
    pub fn with_input(mut self, input: SpecInput) -> Self {
        self.inputs.push(input);
        self
    }

    /// Merges the enrichment stage outputs into the specification.
    pub fn merge_enrichments(
        &mut self,
        audience: AudienceProfile,
        examples: Vec<WorkedExample>,
        microcopy: Microcopy,
    ) {
        self.audience = Some(audience);
        self.examples = examples;
        self.microcopy = Some(microcopy);
    }

    /// Returns true once all enrichment stages have been merged.
    #[must_use]
    pub fn is_enriched(&self) -> bool {
        self.audience.is_some() && self.microcopy.is_some()
    }

    /// Concatenates the designed text fields for content checks.
    #[must_use]
    pub fn searchable_text(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.title, &self.summary];
        parts.extend(self.inputs.iter().map(|i| i.label.as_str()));
        parts.extend(self.outputs.iter().map(String::as_str));
        parts.extend(self.requirements.iter().map(String::as_str));
        parts.join("\n")
    }
}

/// Input to specification extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    /// The free-form request text.
    pub source_text: String,
    /// The caller's template hint, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_hint: Option<String>,
}

/// Result of specification extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExtractionOutcome {
    /// Enough information was present.
    Ready {
        /// The extracted specification.
        specification: Specification,
    },
    /// The request is missing information only the caller can supply.
    NeedsClarification {
        /// Questions for the caller.
        questions: Vec<String>,
    },
}

/// Condensed structured source material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSummary {
    /// The condensed text.
    pub text: String,
    /// Length of the original text in characters.
    pub original_chars: usize,
}

/// Input to source analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// The (possibly summarized) source material.
    pub source_text: String,
    /// Whether the text is a summary of a larger original.
    pub summarized: bool,
}

/// Result of source analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAnalysis {
    /// The analyst's summary of the material.
    pub summary: String,
    /// The required-content contract, when the material carried an explicit
    /// methodology.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builder_context: Option<BuilderContext>,
}

/// Who the tool is for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceProfile {
    /// Short persona description.
    pub persona: String,
    /// Expected expertise level.
    pub expertise: String,
    /// What the audience wants to achieve.
    #[serde(default)]
    pub goals: Vec<String>,
    /// What the audience worries about.
    #[serde(default)]
    pub concerns: Vec<String>,
}

/// A worked example for the tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkedExample {
    /// Example title.
    pub title: String,
    /// The situation being illustrated.
    pub scenario: String,
    /// Input values keyed by input name.
    #[serde(default)]
    pub inputs: BTreeMap<String, serde_json::Value>,
    /// What the tool should conclude.
    pub expected_outcome: String,
}

/// Interface copy for the tool.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Microcopy {
    /// Headline.
    pub headline: String,
    /// Primary call to action.
    pub call_to_action: String,
    /// Labels keyed by input name.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Help text keyed by input name.
    #[serde(default)]
    pub help_text: BTreeMap<String, String>,
}

/// The template chosen for the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateChoice {
    /// Template identifier.
    pub template_id: String,
    /// Why the template was chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

/// Input to the artifact-building stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    /// The enriched specification.
    pub specification: Specification,
    /// The template to build on, if one was hinted or selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// The required-content contract, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builder_context: Option<BuilderContext>,
    /// Corrective directives from the previous attempt's validation.
    #[serde(default)]
    pub fix_instructions: Vec<String>,
    /// 1-based build attempt number.
    pub attempt: u32,
}

/// Severity of an audit finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
    /// Informational.
    Info,
    /// Should be addressed.
    Warning,
    /// Breaks a compliance rule.
    Violation,
}

/// One compliance audit finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFinding {
    /// Severity.
    pub severity: AuditSeverity,
    /// The rule that produced the finding.
    pub rule: String,
    /// Description.
    pub message: String,
}

/// Result of compliance auditing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    /// All findings.
    #[serde(default)]
    pub findings: Vec<AuditFinding>,
}

impl AuditReport {
    /// Returns the number of findings at violation severity.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == AuditSeverity::Violation)
            .count()
    }
}

/// Input to quality grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRequest {
    /// The specification the artifact should satisfy.
    pub specification: Specification,
    /// The artifact to grade.
    pub artifact: Artifact,
}

/// Result of quality grading.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResult {
    /// Whether the artifact meets the acceptance threshold.
    pub passed: bool,
    /// Overall score.
    pub score: f64,
    /// Fixes required before the artifact can pass.
    #[serde(default)]
    pub must_fix: Vec<String>,
    /// Free-form grader feedback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl GradeResult {
    /// Creates a passing grade.
    #[must_use]
    pub fn pass(score: f64) -> Self {
        Self {
            passed: true,
            score,
            must_fix: Vec::new(),
            feedback: None,
        }
    }

    /// Creates a failing grade with required fixes.
    #[must_use]
    pub fn fail(score: f64, must_fix: Vec<String>) -> Self {
        Self {
            passed: false,
            score,
            must_fix,
            feedback: None,
        }
    }
}

/// Input to feedback revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionRequest {
    /// The specification the artifact should satisfy.
    pub specification: Specification,
    /// The artifact to revise.
    pub artifact: Artifact,
    /// The fixes to apply. Revisions must not go beyond this list.
    pub fixes: Vec<String>,
}
