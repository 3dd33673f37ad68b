//! Event sinks for run observability.
//!
//! The orchestrator emits a [`PipelineEvent`](crate::core::PipelineEvent) at
//! the start, completion, failure and retry of every stage, plus run-level
//! start and end events. The sink is injected per orchestrator; there is no
//! process-wide sink.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
