//! Tests for the pipeline context.

#[cfg(test)]
mod tests {
    use crate::context::{PipelineContext, DEFAULT_MAX_REVISIONS};
    use crate::core::{Artifact, GradeResult, StageName, StageOutput};
    use std::time::Duration;

    #[test]
    fn test_new_context_is_empty() {
        let ctx = PipelineContext::new("run-1");
        assert_eq!(ctx.run_id(), "run-1");
        assert!(ctx.current_stage().is_none());
        assert!(ctx.outputs().is_empty());
        assert_eq!(ctx.revision_count(), 0);
        assert_eq!(ctx.max_revisions(), DEFAULT_MAX_REVISIONS);
        assert!(ctx.started_at().contains('T'));
    }

    #[test]
    fn test_enter_stage_tracks_current_and_count() {
        let mut ctx = PipelineContext::new("run-1");
        ctx.enter_stage(StageName::QualityGrading);
        ctx.enter_stage(StageName::FeedbackRevision);
        ctx.enter_stage(StageName::QualityGrading);

        assert_eq!(ctx.current_stage(), Some(StageName::QualityGrading));
        assert_eq!(ctx.invocation_count(StageName::QualityGrading), 2);
        assert_eq!(ctx.invocation_count(StageName::FeedbackRevision), 1);
        assert_eq!(ctx.invocation_count(StageName::ArtifactBuilding), 0);
        assert_eq!(ctx.total_invocations(), 3);
    }

    #[test]
    fn test_record_output_replaces_and_accumulates() {
        let mut ctx = PipelineContext::new("run-1");
        ctx.record_output(
            StageOutput::QualityGrading(GradeResult::fail(0.4, vec!["contrast".into()])),
            Duration::from_millis(30),
        );
        ctx.record_output(
            StageOutput::QualityGrading(GradeResult::pass(0.9)),
            Duration::from_millis(20),
        );

        let latest = ctx.output(StageName::QualityGrading).cloned().unwrap();
        assert!(latest.into_grade().unwrap().passed);
        assert_eq!(ctx.duration(StageName::QualityGrading), Some(Duration::from_millis(50)));
        assert_eq!(ctx.stage_durations().len(), 1);
    }

    #[test]
    fn test_stages_read_prior_outputs() {
        let mut ctx = PipelineContext::new("run-1");
        ctx.record_output(
            StageOutput::ArtifactBuilding(Artifact::new("<p>v1</p>")),
            Duration::ZERO,
        );
        let built = ctx.output(StageName::ArtifactBuilding).unwrap();
        assert_eq!(built.stage_name(), StageName::ArtifactBuilding);
        assert!(ctx.output(StageName::FeedbackRevision).is_none());
    }

    #[test]
    fn test_revision_budget() {
        let mut ctx = PipelineContext::new("run-1").with_max_revisions(2);
        assert!(!ctx.revision_budget_exhausted());
        assert_eq!(ctx.increment_revision(), 1);
        assert!(!ctx.revision_budget_exhausted());
        assert_eq!(ctx.increment_revision(), 2);
        assert!(ctx.revision_budget_exhausted());
    }

    #[test]
    fn test_zero_budget_is_exhausted_immediately() {
        let ctx = PipelineContext::new("run-1").with_max_revisions(0);
        assert!(ctx.revision_budget_exhausted());
    }
}
