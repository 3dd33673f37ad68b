//! Tests for stage input/output dispatch helpers.

#[cfg(test)]
mod tests {
    use crate::core::{
        Artifact, AuditReport, ExtractionOutcome, ExtractionRequest, GradeResult, Microcopy,
        Specification, StageInput, StageName, StageOutput, TemplateChoice,
    };
    use crate::errors::ArtifactflowError;

    #[test]
    fn test_input_stage_names() {
        let spec = Specification::new("BMI", "Body mass index");
        assert_eq!(
            StageInput::AudienceProfiling(spec.clone()).stage_name(),
            StageName::AudienceProfiling
        );
        assert_eq!(
            StageInput::TemplateSelection(spec).stage_name(),
            StageName::TemplateSelection
        );
        assert_eq!(
            StageInput::SpecificationExtraction(ExtractionRequest {
                source_text: "build me a BMI calculator".to_string(),
                template_hint: None,
            })
            .stage_name(),
            StageName::SpecificationExtraction
        );
    }

    #[test]
    fn test_built_and_revised_are_distinct_stages() {
        let artifact = Artifact::new("<p>v1</p>");
        let built = StageOutput::ArtifactBuilding(artifact.clone());
        let revised = StageOutput::FeedbackRevision(artifact);

        assert_eq!(built.stage_name(), StageName::ArtifactBuilding);
        assert_eq!(revised.stage_name(), StageName::FeedbackRevision);
        assert!(revised.clone().into_built().is_err());
        assert!(revised.into_revised().is_ok());
    }

    #[test]
    fn test_accessor_mismatch_names_both_stages() {
        let output = StageOutput::QualityGrading(GradeResult::pass(0.9));
        let err = output.into_audit().unwrap_err();

        match err {
            ArtifactflowError::UnexpectedOutput { stage, actual } => {
                assert_eq!(stage, StageName::ComplianceAuditing);
                assert_eq!(actual, StageName::QualityGrading);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_accessors_round_trip_payloads() {
        let template = StageOutput::TemplateSelection(TemplateChoice {
            template_id: "calculator-v2".to_string(),
            rationale: None,
        });
        assert_eq!(template.into_template().unwrap().template_id, "calculator-v2");

        let copy = StageOutput::CopyGeneration(Microcopy::default());
        assert_eq!(copy.into_microcopy().unwrap(), Microcopy::default());

        let audit = StageOutput::ComplianceAuditing(AuditReport::default());
        assert!(audit.into_audit().unwrap().findings.is_empty());
    }

    #[test]
    fn test_output_summaries() {
        let grade = StageOutput::QualityGrading(GradeResult::fail(0.41, vec!["a".into(), "b".into()]));
        assert_eq!(grade.summary(), "score 0.41 (failed), 2 must-fix");

        let clarify = StageOutput::SpecificationExtraction(ExtractionOutcome::NeedsClarification {
            questions: vec!["Metric or imperial?".to_string()],
        });
        assert_eq!(clarify.summary(), "needs clarification (1 questions)");

        let examples = StageOutput::ExampleGeneration(Vec::new());
        assert_eq!(examples.summary(), "0 examples");
    }

    #[test]
    fn test_output_serialization_is_tagged_by_stage() {
        let output = StageOutput::TemplateSelection(TemplateChoice {
            template_id: "t1".to_string(),
            rationale: Some("numeric inputs".to_string()),
        });
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["stage"], "template-selection");
        assert_eq!(json["output"]["templateId"], "t1");

        let back: StageOutput = serde_json::from_value(json).unwrap();
        assert_eq!(back, output);
    }
}
