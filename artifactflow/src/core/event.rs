//! Structured pipeline events delivered to event sinks.

use super::StageName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The lifecycle moment an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A run or stage started.
    Start,
    /// A run or stage completed.
    Complete,
    /// A run or stage failed.
    Fail,
    /// A stage attempt failed transiently and will be retried.
    Retry,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Complete => write!(f, "complete"),
            Self::Fail => write!(f, "fail"),
            Self::Retry => write!(f, "retry"),
        }
    }
}

/// A structured event emitted during a run.
///
/// Events without a stage describe the run as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineEvent {
    /// The run the event belongs to.
    pub run_id: String,

    /// What happened.
    pub event: EventKind,

    /// The stage involved, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageName>,

    /// Elapsed time, for completion, failure and retry events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    /// A short human-readable summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// When the event occurred (ISO 8601).
    pub timestamp: String,
}

impl PipelineEvent {
    /// Creates a new event for a run.
    #[must_use]
    pub fn new(run_id: impl Into<String>, event: EventKind) -> Self {
        Self {
            run_id: run_id.into(),
            event,
            stage: None,
            duration_ms: None,
            summary: None,
            timestamp: crate::utils::iso_timestamp(),
        }
    }

    /// Sets the stage.
    #[must_use]
    pub fn with_stage(mut self, stage: StageName) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = Some(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Sets the summary.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Returns true if the event describes a stage rather than the run.
    #[must_use]
    pub fn is_stage_event(&self) -> bool {
        self.stage.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder() {
        let event = PipelineEvent::new("run-1", EventKind::Complete)
            .with_stage(StageName::QualityGrading)
            .with_duration(Duration::from_millis(1250))
            .with_summary("passed");

        assert_eq!(event.run_id, "run-1");
        assert_eq!(event.duration_ms, Some(1250));
        assert!(event.is_stage_event());
    }

    #[test]
    fn test_event_serialization_shape() {
        let event = PipelineEvent::new("run-1", EventKind::Retry).with_stage(StageName::ToolDesign);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["runId"], "run-1");
        assert_eq!(json["event"], "retry");
        assert_eq!(json["stage"], "tool-design");
        assert!(json.get("durationMs").is_none());
        assert!(json.get("summary").is_none());
    }
}
