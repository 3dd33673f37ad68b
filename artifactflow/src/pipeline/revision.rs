//! The bounded grade-and-revise loop.

use super::executor::StageExecutor;
use crate::context::PipelineContext;
use crate::core::{
    Artifact, GradeRequest, GradeResult, RevisionOutcome, RevisionRequest, Specification,
    StageInput,
};
use crate::errors::ArtifactflowError;
use tracing::{debug, info};

/// Where the revision loop ended.
#[derive(Debug, Clone, PartialEq)]
pub struct RevisionLoopResult {
    /// The last artifact, revised or not.
    pub artifact: Artifact,
    /// The last grading result.
    pub grade: GradeResult,
    /// Whether the loop ended on a pass or on the budget.
    pub outcome: RevisionOutcome,
}

/// Grades the artifact and revises it until it passes or the revision
/// budget in the context is spent.
///
/// The first grading is unconditional. Each failed grading increments the
/// context's revision counter once; once the counter reaches the budget the
/// loop stops with the latest grade, without a further revision.
pub async fn run_revision_loop(
    exec: &StageExecutor<'_>,
    ctx: &mut PipelineContext,
    specification: &Specification,
    artifact: Artifact,
) -> Result<RevisionLoopResult, ArtifactflowError> {
    let mut artifact = artifact;
    loop {
        let grade = exec
            .execute(
                StageInput::QualityGrading(GradeRequest {
                    specification: specification.clone(),
                    artifact: artifact.clone(),
                }),
                ctx,
            )
            .await?
            .into_grade()?;

        if grade.passed {
            info!(
                run_id = %ctx.run_id(),
                score = grade.score,
                revisions = ctx.revision_count(),
                "Artifact passed grading"
            );
            return Ok(RevisionLoopResult {
                artifact,
                grade,
                outcome: RevisionOutcome::Passed,
            });
        }

        if ctx.revision_budget_exhausted() || ctx.increment_revision() >= ctx.max_revisions() {
            info!(
                run_id = %ctx.run_id(),
                score = grade.score,
                revisions = ctx.revision_count(),
                unresolved = grade.must_fix.len(),
                "Revision budget exhausted"
            );
            return Ok(RevisionLoopResult {
                artifact,
                grade,
                outcome: RevisionOutcome::BudgetExhausted,
            });
        }

        debug!(
            run_id = %ctx.run_id(),
            revision = ctx.revision_count(),
            fixes = grade.must_fix.len(),
            "Revising artifact"
        );
        artifact = exec
            .execute(
                StageInput::FeedbackRevision(RevisionRequest {
                    specification: specification.clone(),
                    artifact,
                    fixes: grade.must_fix,
                }),
                ctx,
            )
            .await?
            .into_revised()?;
    }
}
