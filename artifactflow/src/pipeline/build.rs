//! The bounded build-validate-regenerate loop.

use super::executor::StageExecutor;
use crate::context::PipelineContext;
use crate::core::{Artifact, BuildRequest, StageInput};
use crate::errors::ArtifactflowError;
use crate::validation::{fix_instructions, OutputValidator, ValidationResult};
use tracing::{debug, info, warn};

/// The artifact the build loop settled on.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildLoopResult {
    /// The last artifact built.
    pub artifact: Artifact,
    /// The last validation result; `None` without a builder context.
    pub validation: Option<ValidationResult>,
    /// Number of build attempts made.
    pub attempts: u32,
    /// Regenerations that came back identical to the previous attempt.
    pub stagnant_attempts: u32,
}

/// Builds the artifact and, when the request carries a builder context,
/// regenerates it with fix instructions until it validates or the extra
/// attempts run out.
///
/// Exhaustion is not an error: the last artifact is returned with its
/// outstanding validation errors.
pub async fn run_build_loop(
    exec: &StageExecutor<'_>,
    ctx: &mut PipelineContext,
    request: BuildRequest,
    validator: &OutputValidator,
    max_fix_attempts: u32,
) -> Result<BuildLoopResult, ArtifactflowError> {
    let Some(contract) = request.builder_context.clone() else {
        let artifact = exec
            .execute(
                StageInput::ArtifactBuilding(BuildRequest {
                    attempt: 1,
                    fix_instructions: Vec::new(),
                    ..request
                }),
                ctx,
            )
            .await?
            .into_built()?;
        return Ok(BuildLoopResult {
            artifact,
            validation: None,
            attempts: 1,
            stagnant_attempts: 0,
        });
    };

    let max_attempts = max_fix_attempts.saturating_add(1);
    let mut fixes: Vec<String> = Vec::new();
    let mut previous: Option<Artifact> = None;
    let mut attempt = 1;
    let mut stagnant_attempts = 0;
    loop {
        let artifact = exec
            .execute(
                StageInput::ArtifactBuilding(BuildRequest {
                    attempt,
                    fix_instructions: fixes.clone(),
                    ..request.clone()
                }),
                ctx,
            )
            .await?
            .into_built()?;

        if previous.as_ref().is_some_and(|p| p.same_content(&artifact)) {
            stagnant_attempts += 1;
            warn!(
                run_id = %ctx.run_id(),
                attempt,
                fingerprint = %artifact.fingerprint,
                "Regenerated artifact is identical to the previous attempt"
            );
        }

        let result = validator.validate(&artifact.content, &contract);
        for issue in &result.warnings {
            debug!(run_id = %ctx.run_id(), code = %issue.code, field = %issue.field, "{}", issue.message);
        }

        if result.passed {
            info!(run_id = %ctx.run_id(), attempt, "Artifact satisfies the builder context");
            return Ok(BuildLoopResult {
                artifact,
                validation: Some(result),
                attempts: attempt,
                stagnant_attempts,
            });
        }
        if attempt >= max_attempts {
            warn!(
                run_id = %ctx.run_id(),
                attempt,
                outstanding = result.errors.len(),
                "Output validation attempts exhausted; continuing with last artifact"
            );
            return Ok(BuildLoopResult {
                artifact,
                validation: Some(result),
                attempts: attempt,
                stagnant_attempts,
            });
        }

        fixes = fix_instructions(&result);
        info!(
            run_id = %ctx.run_id(),
            attempt,
            errors = result.errors.len(),
            fixes = fixes.len(),
            "Artifact failed output validation; regenerating"
        );
        previous = Some(artifact);
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{StageName, StageOutput};
    use crate::events::NoOpEventSink;
    use crate::pipeline::guard::RunGuard;
    use crate::pipeline::retry::RetryConfig;
    use crate::stages::StageRegistry;
    use crate::testing::{
        bare_html, sample_builder_context, sample_specification, satisfying_html, ScriptedStage,
    };
    use std::sync::Arc;

    fn request(with_contract: bool) -> BuildRequest {
        BuildRequest {
            specification: sample_specification(),
            template_id: None,
            builder_context: with_contract.then(sample_builder_context),
            fix_instructions: Vec::new(),
            attempt: 1,
        }
    }

    fn built(html: String) -> StageOutput {
        StageOutput::ArtifactBuilding(Artifact::new(html))
    }

    async fn run(
        builder: Arc<ScriptedStage>,
        with_contract: bool,
        max_fix_attempts: u32,
    ) -> BuildLoopResult {
        let registry = StageRegistry::builder().register_arc(builder).build();
        let retry = RetryConfig::default();
        let sink = NoOpEventSink;
        let guard = RunGuard::default();
        let exec = StageExecutor::new(&registry, &retry, &sink, &guard);
        let mut ctx = PipelineContext::new("run-build");

        run_build_loop(
            &exec,
            &mut ctx,
            request(with_contract),
            &OutputValidator::new(),
            max_fix_attempts,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_identical_regenerations_are_counted() {
        let builder = Arc::new(ScriptedStage::new(StageName::ArtifactBuilding, built(bare_html())));

        let result = run(builder.clone(), true, 2).await;

        assert_eq!(result.attempts, 3);
        assert_eq!(result.stagnant_attempts, 2);
        assert!(!result.validation.unwrap().passed);
        assert_eq!(builder.call_count(), 3);
    }

    #[tokio::test]
    async fn test_changed_regeneration_is_not_stagnant() {
        let builder = Arc::new(
            ScriptedStage::new(StageName::ArtifactBuilding, built(bare_html()))
                .then(built(satisfying_html())),
        );

        let result = run(builder, true, 2).await;

        assert_eq!(result.attempts, 2);
        assert_eq!(result.stagnant_attempts, 0);
        assert!(result.validation.unwrap().passed);
    }

    #[tokio::test]
    async fn test_without_contract_builds_once() {
        let builder = Arc::new(ScriptedStage::new(StageName::ArtifactBuilding, built(bare_html())));

        let result = run(builder.clone(), false, 2).await;

        assert_eq!(result.attempts, 1);
        assert!(result.validation.is_none());
        assert_eq!(builder.call_count(), 1);
    }
}
