//! Uniform stage invocation: resolve, time, retry, record, report.

use super::guard::RunGuard;
use super::retry::{with_retry, RetryConfig};
use crate::context::PipelineContext;
use crate::core::{EventKind, PipelineEvent, StageInput, StageOutput};
use crate::errors::ArtifactflowError;
use crate::events::EventSink;
use crate::stages::{Stage, StageRegistry};
use tokio::time::Instant;

/// Runs single stages on behalf of the orchestrator.
///
/// Borrowed for the duration of one run; holds no state of its own.
pub struct StageExecutor<'a> {
    registry: &'a StageRegistry,
    retry: &'a RetryConfig,
    sink: &'a dyn EventSink,
    guard: &'a RunGuard,
}

impl<'a> StageExecutor<'a> {
    /// Creates an executor.
    #[must_use]
    pub fn new(
        registry: &'a StageRegistry,
        retry: &'a RetryConfig,
        sink: &'a dyn EventSink,
        guard: &'a RunGuard,
    ) -> Self {
        Self {
            registry,
            retry,
            sink,
            guard,
        }
    }

    /// Executes the stage the input is addressed to.
    ///
    /// Records the stage as current, runs it under the retry policy raced
    /// against cancellation and the run deadline, then stores the output and
    /// the call's duration in the context. The output must belong to the
    /// dispatched stage.
    pub async fn execute(
        &self,
        input: StageInput,
        ctx: &mut PipelineContext,
    ) -> Result<StageOutput, ArtifactflowError> {
        let name = input.stage_name();
        self.guard.check(ctx.current_stage())?;
        let stage = self.registry.get(name)?;

        ctx.enter_stage(name);
        self.sink
            .emit(PipelineEvent::new(ctx.run_id(), EventKind::Start).with_stage(name))
            .await;

        let started = Instant::now();
        let result = {
            let shared: &PipelineContext = ctx;
            let stage: &dyn Stage = stage.as_ref();
            let input = &input;
            let sink = self.sink;
            let call = with_retry(
                self.retry,
                move |_attempt| stage.execute(input.clone(), shared),
                |notice| {
                    sink.try_emit(
                        PipelineEvent::new(shared.run_id(), EventKind::Retry)
                            .with_stage(name)
                            .with_duration(notice.delay)
                            .with_summary(format!(
                                "attempt {} failed: {}",
                                notice.attempt, notice.message
                            )),
                    );
                },
            );
            tokio::select! {
                outcome = call => outcome.map_err(|source| ArtifactflowError::stage(name, source)),
                err = self.guard.interrupted(Some(name)) => Err(err),
            }
        };
        let elapsed = started.elapsed();

        let result = result.and_then(|output| {
            if output.stage_name() == name {
                Ok(output)
            } else {
                Err(ArtifactflowError::UnexpectedOutput {
                    stage: name,
                    actual: output.stage_name(),
                })
            }
        });

        match result {
            Ok(output) => {
                self.sink
                    .emit(
                        PipelineEvent::new(ctx.run_id(), EventKind::Complete)
                            .with_stage(name)
                            .with_duration(elapsed)
                            .with_summary(output.summary()),
                    )
                    .await;
                ctx.record_output(output.clone(), elapsed);
                Ok(output)
            }
            Err(err) => {
                ctx.record_duration(name, elapsed);
                self.sink
                    .emit(
                        PipelineEvent::new(ctx.run_id(), EventKind::Fail)
                            .with_stage(name)
                            .with_duration(elapsed)
                            .with_summary(err.run_message()),
                    )
                    .await;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::CancellationToken;
    use crate::core::{Artifact, AuditReport, StageName};
    use crate::errors::StageError;
    use crate::events::CollectingEventSink;
    use crate::stages::{AsyncFnStage, FnStage};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn audit_input() -> StageInput {
        StageInput::ComplianceAuditing(Artifact::new("<p>ok</p>"))
    }

    #[tokio::test]
    async fn test_execute_records_output_and_events() {
        let registry = StageRegistry::builder()
            .register(FnStage::new(StageName::ComplianceAuditing, |_, _| {
                Ok(StageOutput::ComplianceAuditing(AuditReport::default()))
            }))
            .build();
        let retry = RetryConfig::default();
        let sink = CollectingEventSink::new();
        let guard = RunGuard::default();
        let exec = StageExecutor::new(&registry, &retry, &sink, &guard);

        let mut ctx = PipelineContext::new("run-1");
        let output = exec.execute(audit_input(), &mut ctx).await.unwrap();

        assert_eq!(output.stage_name(), StageName::ComplianceAuditing);
        assert_eq!(ctx.current_stage(), Some(StageName::ComplianceAuditing));
        assert!(ctx.output(StageName::ComplianceAuditing).is_some());
        assert!(ctx.duration(StageName::ComplianceAuditing).is_some());

        let kinds: Vec<_> = sink.events().iter().map(|e| e.event).collect();
        assert_eq!(kinds, vec![EventKind::Start, EventKind::Complete]);
        assert!(sink.events().iter().all(|e| e.run_id == "run-1"));
    }

    #[tokio::test]
    async fn test_unknown_stage_is_fatal() {
        let registry = StageRegistry::default();
        let retry = RetryConfig::default();
        let sink = CollectingEventSink::new();
        let guard = RunGuard::default();
        let exec = StageExecutor::new(&registry, &retry, &sink, &guard);

        let mut ctx = PipelineContext::new("run-1");
        let err = exec.execute(audit_input(), &mut ctx).await.unwrap_err();
        assert!(matches!(err, ArtifactflowError::UnknownStage(StageName::ComplianceAuditing)));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_output_variant_is_rejected() {
        let registry = StageRegistry::builder()
            .register(FnStage::new(StageName::ComplianceAuditing, |_, _| {
                Ok(StageOutput::ArtifactBuilding(Artifact::new("<p/>")))
            }))
            .build();
        let retry = RetryConfig::default();
        let sink = CollectingEventSink::new();
        let guard = RunGuard::default();
        let exec = StageExecutor::new(&registry, &retry, &sink, &guard);

        let mut ctx = PipelineContext::new("run-1");
        let err = exec.execute(audit_input(), &mut ctx).await.unwrap_err();
        assert!(matches!(
            err,
            ArtifactflowError::UnexpectedOutput {
                stage: StageName::ComplianceAuditing,
                actual: StageName::ArtifactBuilding
            }
        ));
        assert!(ctx.output(StageName::ArtifactBuilding).is_none());
        assert_eq!(sink.events_of_kind(EventKind::Fail).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_emit_retry_events() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let registry = StageRegistry::builder()
            .register(AsyncFnStage::new(StageName::ComplianceAuditing, move |_| {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(StageError::new("rate limit exceeded"))
                    } else {
                        Ok(StageOutput::ComplianceAuditing(AuditReport::default()))
                    }
                }
            }))
            .build();
        let retry = RetryConfig::default();
        let sink = CollectingEventSink::new();
        let guard = RunGuard::default();
        let exec = StageExecutor::new(&registry, &retry, &sink, &guard);

        let mut ctx = PipelineContext::new("run-1");
        exec.execute(audit_input(), &mut ctx).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let retries = sink.events_of_kind(EventKind::Retry);
        let delays: Vec<_> = retries.iter().map(|e| e.duration_ms).collect();
        assert_eq!(delays, vec![Some(1000), Some(2000)]);
        assert_eq!(ctx.invocation_count(StageName::ComplianceAuditing), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_backoff() {
        let registry = StageRegistry::builder()
            .register(FnStage::new(StageName::ComplianceAuditing, |_, _| {
                Err(StageError::new("network unreachable"))
            }))
            .build();
        let retry = RetryConfig::default().with_base_delay_ms(60_000).with_max_delay_ms(60_000);
        let sink = CollectingEventSink::new();
        let token = CancellationToken::new();
        let guard = RunGuard::new(Some(token.clone()), None);
        let exec = StageExecutor::new(&registry, &retry, &sink, &guard);

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            token.cancel("caller gave up");
        });

        let mut ctx = PipelineContext::new("run-1");
        let err = exec.execute(audit_input(), &mut ctx).await.unwrap_err();
        canceller.await.unwrap();

        match err {
            ArtifactflowError::Cancelled { stage, reason } => {
                assert_eq!(stage, Some(StageName::ComplianceAuditing));
                assert_eq!(reason, "caller gave up");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
