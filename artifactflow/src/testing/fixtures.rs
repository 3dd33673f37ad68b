//! Sample payloads and registries for orchestrator tests.

use crate::core::{
    Artifact, AudienceProfile, AuditReport, ExtractionOutcome, GradeResult, Microcopy,
    SourceAnalysis, SourceSummary, SpecInput, Specification, StageName, StageOutput,
    TemplateChoice, WorkedExample,
};
use crate::stages::StageRegistryBuilder;
use crate::validation::{BuilderContext, Calculation, FrameworkItem, TermUsage};
use std::collections::BTreeMap;

use super::mocks::ScriptedStage;

/// Quote used by [`sample_builder_context`]; longer than the default prefix window.
pub const SAMPLE_QUOTE: &str = "Never launch on hope. Every gate you skip today becomes a \
    fire you fight after launch, so score each gate honestly.";

/// A small specification for a BMI calculator.
#[must_use]
pub fn sample_specification() -> Specification {
    Specification::new("BMI Calculator", "Computes body mass index from height and weight")
        .with_input(SpecInput {
            name: "height".to_string(),
            label: "Height (cm)".to_string(),
            kind: "number".to_string(),
            placeholder: Some("170".to_string()),
        })
        .with_input(SpecInput {
            name: "weight".to_string(),
            label: "Weight (kg)".to_string(),
            kind: "number".to_string(),
            placeholder: Some("65".to_string()),
        })
        .with_requirement("Show the BMI category next to the number")
}

/// A specification that reflects every item of [`sample_builder_context`].
#[must_use]
pub fn sample_designed_specification() -> Specification {
    Specification::new("Launch Readiness Scorecard", "Scores a launch against five gates")
        .with_requirement("Score Market Fit from 1 to 5")
        .with_requirement("Score Team Capacity from 1 to 5")
        .with_requirement("Score Risk Exposure from 1 to 5")
        .with_requirement("Total = sum of gate scores; go when total >= 12")
}

/// A builder context with three framework items, one critical and one
/// advisory term, an expert quote and a calculation.
#[must_use]
pub fn sample_builder_context() -> BuilderContext {
    BuilderContext::new("Launch Readiness Scorecard")
        .with_item(
            FrameworkItem::new(1, "Gate 1: Market Fit", "Evidence of demand from paying customers")
                .with_input_kind("number"),
        )
        .with_item(
            FrameworkItem::new(2, "Gate 2: Team Capacity", "Whether the team can support the launch")
                .with_input_kind("number"),
        )
        .with_item(
            FrameworkItem::new(3, "Gate 3: Risk Exposure", "Downside if the launch slips")
                .with_input_kind("number"),
        )
        .with_term(TermUsage::new("paying customers", "Always 'paying', never 'users'"))
        .with_term(TermUsage::new("launch window", "Used loosely in the course"))
        .with_quote(SAMPLE_QUOTE, "Course instructor")
        .with_calculation(Calculation {
            formula: "Total = sum of gate scores".to_string(),
            go_criterion: "Total >= 12".to_string(),
            no_go_criterion: "Total < 12".to_string(),
        })
}

/// HTML that satisfies every blocking check of [`sample_builder_context`]
/// and mentions every term.
#[must_use]
pub fn satisfying_html() -> String {
    format!(
        "<h1>Launch Readiness Scorecard</h1>\
         <label>Market Fit</label><label>Team Capacity</label><label>Risk Exposure</label>\
         <p>Demand from paying customers inside the launch window.</p>\
         <blockquote>{SAMPLE_QUOTE}</blockquote>"
    )
}

/// HTML that misses every framework label, the critical term and the quote.
#[must_use]
pub fn bare_html() -> String {
    "<h1>Launch Readiness Scorecard</h1><p>Rate your launch.</p>".to_string()
}

/// Source text that the admission heuristic classifies as structured.
#[must_use]
pub fn structured_source() -> String {
    "Module 4: Launch Readiness\n\
     ## Learning objectives\n\
     1. Apply the three-gate framework\n\
     2. Score each gate from 1 to 5\n\
     - Gate 1: Market Fit\n\
     - Gate 2: Team Capacity\n\
     - Gate 3: Risk Exposure\n"
        .to_string()
}

/// A stage registry builder with a happy-path stage for every stage name.
///
/// Extraction is ready on the first try, analysis yields no builder context,
/// building returns a small artifact and grading passes. Register
/// replacements on the returned builder to script other paths.
#[must_use]
pub fn happy_path_stages() -> StageRegistryBuilder {
    let spec = sample_specification();
    let mut labels = BTreeMap::new();
    labels.insert("height".to_string(), "Your height".to_string());

    crate::stages::StageRegistry::builder()
        .register(ScriptedStage::new(
            StageName::SourceSummarization,
            StageOutput::SourceSummarization(SourceSummary {
                text: structured_source(),
                original_chars: 0,
            }),
        ))
        .register(ScriptedStage::new(
            StageName::SourceAnalysis,
            StageOutput::SourceAnalysis(SourceAnalysis {
                summary: "A launch readiness module".to_string(),
                builder_context: None,
            }),
        ))
        .register(ScriptedStage::new(
            StageName::ToolDesign,
            StageOutput::ToolDesign(sample_designed_specification()),
        ))
        .register(ScriptedStage::new(
            StageName::SpecificationExtraction,
            StageOutput::SpecificationExtraction(ExtractionOutcome::Ready {
                specification: spec,
            }),
        ))
        .register(ScriptedStage::new(
            StageName::AudienceProfiling,
            StageOutput::AudienceProfiling(AudienceProfile {
                persona: "adult checking their health".to_string(),
                expertise: "novice".to_string(),
                ..AudienceProfile::default()
            }),
        ))
        .register(ScriptedStage::new(
            StageName::ExampleGeneration,
            StageOutput::ExampleGeneration(vec![WorkedExample {
                title: "Average adult".to_string(),
                scenario: "170 cm, 65 kg".to_string(),
                inputs: BTreeMap::new(),
                expected_outcome: "BMI 22.5, normal".to_string(),
            }]),
        ))
        .register(ScriptedStage::new(
            StageName::CopyGeneration,
            StageOutput::CopyGeneration(Microcopy {
                headline: "Check your BMI".to_string(),
                call_to_action: "Calculate".to_string(),
                labels,
                help_text: BTreeMap::new(),
            }),
        ))
        .register(ScriptedStage::new(
            StageName::TemplateSelection,
            StageOutput::TemplateSelection(TemplateChoice {
                template_id: "calculator-basic".to_string(),
                rationale: None,
            }),
        ))
        .register(ScriptedStage::new(
            StageName::ArtifactBuilding,
            StageOutput::ArtifactBuilding(Artifact::new("<h1>BMI Calculator</h1>")),
        ))
        .register(ScriptedStage::new(
            StageName::ComplianceAuditing,
            StageOutput::ComplianceAuditing(AuditReport::default()),
        ))
        .register(ScriptedStage::new(
            StageName::QualityGrading,
            StageOutput::QualityGrading(GradeResult::pass(0.92)),
        ))
        .register(ScriptedStage::new(
            StageName::FeedbackRevision,
            StageOutput::FeedbackRevision(Artifact::new("<h1>BMI Calculator (revised)</h1>")),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestLimits;
    use crate::stages::REQUIRED_STAGES;
    use crate::validation::{validate_design, OutputValidator};

    #[test]
    fn test_happy_path_registry_is_complete() {
        let registry = happy_path_stages().build();
        assert!(registry.missing_required().is_empty());
        assert_eq!(registry.len(), StageName::ALL.len());
        assert!(REQUIRED_STAGES.iter().all(|s| registry.contains(*s)));
    }

    #[test]
    fn test_sample_html_against_contract() {
        let contract = sample_builder_context();
        let validator = OutputValidator::new();

        let good = validator.validate(&satisfying_html(), &contract);
        assert!(good.passed, "{:?}", good.errors);
        assert!(good.warnings.is_empty());

        let bad = validator.validate(&bare_html(), &contract);
        assert!(!bad.passed);
    }

    #[test]
    fn test_structured_source_is_structured() {
        assert!(RequestLimits::default().classify(&structured_source()).is_structured());
    }

    #[test]
    fn test_designed_specification_covers_contract() {
        let result = validate_design(&sample_designed_specification(), &sample_builder_context());
        assert!(result.passed, "{:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }
}
