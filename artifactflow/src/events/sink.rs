//! Event sink trait and implementations.

use crate::core::{EventKind, PipelineEvent, StageName};
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info, warn, Level};

/// Receives structured pipeline events.
///
/// Sinks are purely observational: the orchestrator never reads events back
/// and a sink must never fail the run.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Emits an event asynchronously.
    async fn emit(&self, event: PipelineEvent) {
        self.try_emit(event);
    }

    /// Emits an event without blocking. Must not panic or propagate errors.
    fn try_emit(&self, event: PipelineEvent);
}

/// A sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    fn try_emit(&self, _event: PipelineEvent) {}
}

/// A sink that logs events through `tracing`.
///
/// Failures are always logged at `warn`; other events use the configured
/// level.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventSink {
    /// Creates a logging sink with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Creates an info-level logging sink.
    #[must_use]
    pub fn info() -> Self {
        Self::new(Level::INFO)
    }

    fn log_event(&self, event: &PipelineEvent) {
        let stage = event.stage.map_or("run", |s| s.as_str());
        let summary = event.summary.as_deref().unwrap_or("");
        if event.event == EventKind::Fail {
            warn!(
                run_id = %event.run_id,
                stage,
                duration_ms = ?event.duration_ms,
                "{} {}: {}", stage, event.event, summary
            );
            return;
        }
        if self.level == Level::DEBUG {
            debug!(
                run_id = %event.run_id,
                stage,
                duration_ms = ?event.duration_ms,
                "{} {}: {}", stage, event.event, summary
            );
        } else {
            info!(
                run_id = %event.run_id,
                stage,
                duration_ms = ?event.duration_ms,
                "{} {}: {}", stage, event.event, summary
            );
        }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    fn try_emit(&self, event: PipelineEvent) {
        self.log_event(&event);
    }
}

/// A sink that keeps every event in memory, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<PipelineEvent>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Returns events of the given kind.
    #[must_use]
    pub fn events_of_kind(&self, kind: EventKind) -> Vec<PipelineEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event == kind)
            .cloned()
            .collect()
    }

    /// Returns events about the given stage.
    #[must_use]
    pub fn events_for_stage(&self, stage: StageName) -> Vec<PipelineEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.stage == Some(stage))
            .cloned()
            .collect()
    }

    /// Returns the stages that started, in order.
    #[must_use]
    pub fn started_stages(&self) -> Vec<StageName> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event == EventKind::Start)
            .filter_map(|e| e.stage)
            .collect()
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    fn try_emit(&self, event: PipelineEvent) {
        self.events.write().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn stage_event(kind: EventKind, stage: StageName) -> PipelineEvent {
        PipelineEvent::new("run-1", kind).with_stage(stage)
    }

    #[tokio::test]
    async fn test_noop_sink() {
        let sink = NoOpEventSink;
        sink.emit(PipelineEvent::new("run-1", EventKind::Start)).await;
        sink.try_emit(PipelineEvent::new("run-1", EventKind::Complete));
    }

    #[tokio::test]
    async fn test_logging_sink() {
        let sink = LoggingEventSink::default();
        sink.emit(stage_event(EventKind::Start, StageName::ArtifactBuilding)).await;
        sink.try_emit(
            stage_event(EventKind::Fail, StageName::ArtifactBuilding)
                .with_duration(Duration::from_millis(12))
                .with_summary("invalid spec"),
        );
        LoggingEventSink::debug().try_emit(PipelineEvent::new("run-1", EventKind::Complete));
    }

    #[tokio::test]
    async fn test_collecting_sink() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        sink.emit(stage_event(EventKind::Start, StageName::QualityGrading)).await;
        sink.try_emit(stage_event(EventKind::Complete, StageName::QualityGrading));

        assert_eq!(sink.len(), 2);
        let events = sink.events();
        assert_eq!(events[0].event, EventKind::Start);
        assert_eq!(events[1].event, EventKind::Complete);
    }

    #[tokio::test]
    async fn test_collecting_sink_filters() {
        let sink = CollectingEventSink::new();
        sink.try_emit(stage_event(EventKind::Start, StageName::AudienceProfiling));
        sink.try_emit(stage_event(EventKind::Complete, StageName::AudienceProfiling));
        sink.try_emit(stage_event(EventKind::Start, StageName::CopyGeneration));
        sink.try_emit(PipelineEvent::new("run-1", EventKind::Complete));

        assert_eq!(sink.events_of_kind(EventKind::Complete).len(), 2);
        assert_eq!(sink.events_for_stage(StageName::AudienceProfiling).len(), 2);
        assert_eq!(
            sink.started_stages(),
            vec![StageName::AudienceProfiling, StageName::CopyGeneration]
        );

        sink.clear();
        assert!(sink.is_empty());
    }
}
