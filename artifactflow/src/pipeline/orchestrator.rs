//! End-to-end orchestration of one run.
//!
//! The control flow is fixed:
//!
//! 1. request admission
//! 2. specification, either designed from structured source material
//!    (summarize if large, analyze, design) or extracted from a free-form
//!    request, which may end the run with clarification questions
//! 3. audience, example and copy enrichment, merged into the specification
//! 4. template selection, unless hinted or opted out
//! 5. building, regenerated with fix instructions while output validation fails
//! 6. compliance auditing, logged only
//! 7. the grade-and-revise loop
//!
//! Every stage call goes through the [`StageExecutor`], so retries, events,
//! cancellation and the deadline apply uniformly.

use super::build::run_build_loop;
use super::config::OrchestratorConfig;
use super::executor::StageExecutor;
use super::guard::RunGuard;
use super::result::{RunError, RunResult, Timing};
use super::revision::run_revision_loop;
use crate::cancellation::CancellationToken;
use crate::context::{PipelineContext, RunRequest};
use crate::core::{
    AnalysisRequest, Artifact, AuditReport, AuditSeverity, BuildRequest, EventKind,
    ExtractionOutcome, ExtractionRequest, GradeResult, PipelineEvent, RevisionOutcome,
    Specification, StageInput,
};
use crate::errors::ArtifactflowError;
use crate::events::{EventSink, LoggingEventSink};
use crate::stages::{NoOpQualityScorer, QualityScorer, StageRegistry};
use crate::validation::{
    validate_design, validate_extraction, BuilderContext, OutputValidator, ValidationResult,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How a run ended, before it is turned into a [`RunResult`].
enum Flow {
    Completed(Box<Completed>),
    NeedsClarification(Vec<String>),
}

struct Completed {
    artifact: Artifact,
    grade: GradeResult,
    outcome: RevisionOutcome,
    validation: Option<ValidationResult>,
    audit: AuditReport,
}

/// Drives runs through the fixed stage sequence.
///
/// An orchestrator holds only read-only collaborators, so one instance can
/// serve any number of concurrent runs; each run owns its own
/// [`PipelineContext`].
pub struct Orchestrator {
    registry: Arc<StageRegistry>,
    config: OrchestratorConfig,
    validator: OutputValidator,
    sink: Arc<dyn EventSink>,
    scorer: Arc<dyn QualityScorer>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("stages", &self.registry.names())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Creates an orchestrator.
    ///
    /// Fails if the configuration is invalid or the registry lacks a stage
    /// the control flow always needs.
    pub fn new(
        registry: impl Into<Arc<StageRegistry>>,
        config: OrchestratorConfig,
    ) -> Result<Self, ArtifactflowError> {
        config.validate()?;
        let registry = registry.into();
        let missing = registry.missing_required();
        if let Some(stage) = missing.first() {
            return Err(ArtifactflowError::UnknownStage(*stage));
        }
        let validator = OutputValidator::new().with_quote_prefix_chars(config.quote_prefix_chars);
        Ok(Self {
            registry,
            config,
            validator,
            sink: Arc::new(LoggingEventSink::default()),
            scorer: Arc::new(NoOpQualityScorer),
        })
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces the quality scorer.
    #[must_use]
    pub fn with_quality_scorer(mut self, scorer: Arc<dyn QualityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Runs a request to completion.
    ///
    /// Never returns an error: every failure is reported in the result.
    pub async fn run(&self, request: RunRequest) -> RunResult {
        let guard = RunGuard::new(None, self.config.run_timeout());
        self.run_guarded(request, guard).await
    }

    /// Runs a request that the caller may cancel through `token`.
    pub async fn run_with_cancellation(
        &self,
        request: RunRequest,
        token: CancellationToken,
    ) -> RunResult {
        let guard = RunGuard::new(Some(token), self.config.run_timeout());
        self.run_guarded(request, guard).await
    }

    async fn run_guarded(&self, request: RunRequest, guard: RunGuard) -> RunResult {
        let mut ctx =
            PipelineContext::new(request.run_id.clone()).with_max_revisions(self.config.max_revisions);
        info!(run_id = %ctx.run_id(), source_chars = request.source_text.len(), "Run started");
        self.sink
            .emit(PipelineEvent::new(ctx.run_id(), EventKind::Start))
            .await;

        let flow = self.drive(&request, &mut ctx, &guard).await;
        let timing = Timing::from_durations(ctx.elapsed(), ctx.stage_durations());
        let started_at = ctx.started_at().to_string();

        let result = match flow {
            Ok(Flow::Completed(done)) => {
                let Completed {
                    artifact,
                    grade,
                    outcome,
                    validation,
                    audit,
                } = *done;
                self.spawn_scoring(ctx.run_id(), &artifact);
                RunResult {
                    grade_result: Some(grade),
                    revision_count: ctx.revision_count(),
                    revision_outcome: Some(outcome),
                    validation,
                    audit: Some(audit),
                    ..RunResult::completed(ctx.run_id(), started_at, timing, artifact)
                }
            }
            Ok(Flow::NeedsClarification(questions)) => {
                info!(run_id = %ctx.run_id(), questions = questions.len(), "Run needs clarification");
                RunResult::needs_clarification(ctx.run_id(), started_at, timing, questions)
            }
            Err(err) => {
                warn!(
                    run_id = %ctx.run_id(),
                    stage = ?err.failed_stage(),
                    error = %err,
                    "Run failed"
                );
                RunResult::failed(ctx.run_id(), started_at, timing, RunError::from(&err))
            }
        };

        let event = PipelineEvent::new(ctx.run_id(), terminal_kind(&result))
            .with_duration(ctx.elapsed())
            .with_summary(match &result.error {
                Some(err) => err.message.clone(),
                None => result.status.to_string(),
            });
        self.sink.emit(event).await;
        result
    }

    async fn drive(
        &self,
        request: &RunRequest,
        ctx: &mut PipelineContext,
        guard: &RunGuard,
    ) -> Result<Flow, ArtifactflowError> {
        let shape = request.validate(&self.config.limits)?;
        debug!(run_id = %ctx.run_id(), shape = shape.as_str(), "Request admitted");

        let exec = StageExecutor::new(&self.registry, &self.config.retry, self.sink.as_ref(), guard);

        let (mut specification, builder_context) = if shape.is_structured() {
            self.design_from_source(&exec, ctx, &request.source_text).await?
        } else {
            let outcome = exec
                .execute(
                    StageInput::SpecificationExtraction(ExtractionRequest {
                        source_text: request.source_text.clone(),
                        template_hint: request.template_hint.clone(),
                    }),
                    ctx,
                )
                .await?
                .into_extraction()?;
            match outcome {
                ExtractionOutcome::Ready { specification } => (specification, None),
                ExtractionOutcome::NeedsClarification { questions } => {
                    return Ok(Flow::NeedsClarification(questions));
                }
            }
        };

        // Each enrichment reads only the base specification.
        let base = specification.clone();
        let audience = exec
            .execute(StageInput::AudienceProfiling(base.clone()), ctx)
            .await?
            .into_audience()?;
        let examples = exec
            .execute(StageInput::ExampleGeneration(base.clone()), ctx)
            .await?
            .into_examples()?;
        let microcopy = exec
            .execute(StageInput::CopyGeneration(base), ctx)
            .await?
            .into_microcopy()?;
        specification.merge_enrichments(audience, examples, microcopy);

        let template_id = if request.wants_template_selection() {
            let choice = exec
                .execute(StageInput::TemplateSelection(specification.clone()), ctx)
                .await?
                .into_template()?;
            Some(choice.template_id)
        } else {
            request.template_hint.clone()
        };

        let built = run_build_loop(
            &exec,
            ctx,
            BuildRequest {
                specification: specification.clone(),
                template_id,
                builder_context,
                fix_instructions: Vec::new(),
                attempt: 1,
            },
            &self.validator,
            self.config.max_output_fix_attempts,
        )
        .await?;

        let audit = exec
            .execute(StageInput::ComplianceAuditing(built.artifact.clone()), ctx)
            .await?
            .into_audit()?;
        for finding in audit
            .findings
            .iter()
            .filter(|f| f.severity == AuditSeverity::Violation)
        {
            warn!(run_id = %ctx.run_id(), rule = %finding.rule, "Compliance violation: {}", finding.message);
        }

        let revised = run_revision_loop(&exec, ctx, &specification, built.artifact).await?;

        Ok(Flow::Completed(Box::new(Completed {
            artifact: revised.artifact,
            grade: revised.grade,
            outcome: revised.outcome,
            validation: built.validation,
            audit,
        })))
    }

    /// The structured-material sub-pipeline: summarize if large, analyze,
    /// then design.
    async fn design_from_source(
        &self,
        exec: &StageExecutor<'_>,
        ctx: &mut PipelineContext,
        source: &str,
    ) -> Result<(Specification, Option<BuilderContext>), ArtifactflowError> {
        let original_chars = source.chars().count();
        let (source_text, summarized) = if original_chars > self.config.summarize_threshold_chars {
            let summary = exec
                .execute(StageInput::SourceSummarization(source.to_string()), ctx)
                .await?
                .into_source_summary()?;
            (summary.text, true)
        } else {
            (source.to_string(), false)
        };

        let analysis = exec
            .execute(
                StageInput::SourceAnalysis(AnalysisRequest {
                    source_text,
                    summarized,
                }),
                ctx,
            )
            .await?
            .into_source_analysis()?;
        let builder_context = analysis.builder_context.clone();
        if let Some(contract) = &builder_context {
            log_findings(ctx.run_id(), &validate_extraction(contract));
        }

        let specification = exec
            .execute(StageInput::ToolDesign(analysis), ctx)
            .await?
            .into_design()?;
        if let Some(contract) = &builder_context {
            log_findings(ctx.run_id(), &validate_design(&specification, contract));
        }

        Ok((specification, builder_context))
    }

    fn spawn_scoring(&self, run_id: &str, artifact: &Artifact) {
        if !self.config.score_quality {
            return;
        }
        let scorer = Arc::clone(&self.scorer);
        let run_id = run_id.to_string();
        let artifact_id = artifact.id.clone();
        let text = artifact.content.clone();
        tokio::spawn(async move {
            match scorer.score(&run_id, &artifact_id, &text).await {
                Ok(score) => debug!(run_id = %run_id, score = score.score, "Artifact scored"),
                Err(err) => warn!(run_id = %run_id, error = %err, "Quality scoring failed"),
            }
        });
    }
}

fn terminal_kind(result: &RunResult) -> EventKind {
    if result.error.is_some() {
        EventKind::Fail
    } else {
        EventKind::Complete
    }
}

fn log_findings(run_id: &str, result: &ValidationResult) {
    for issue in &result.errors {
        warn!(run_id, stage = %result.stage, code = %issue.code, field = %issue.field, "{}", issue.message);
    }
    for issue in &result.warnings {
        debug!(run_id, stage = %result.stage, code = %issue.code, field = %issue.field, "{}", issue.message);
    }
    info!(
        run_id,
        stage = %result.stage,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "Builder context checked"
    );
}
