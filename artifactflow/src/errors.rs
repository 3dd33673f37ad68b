//! Error types for the artifactflow orchestrator.
//!
//! The taxonomy mirrors how a run can end badly:
//!
//! - [`RequestValidationError`]: the run request was malformed and no stage ran.
//! - [`StageError`]: a stage raised an error; the retry policy classifies it.
//! - [`CompletionError`]: the AI completion port failed; converts into a
//!   [`StageError`] whose message keeps the transient markers.
//! - [`ArtifactflowError`]: everything the orchestrator itself can surface.

use crate::core::StageName;
use crate::pipeline::ErrorClass;
use std::time::Duration;
use thiserror::Error;

/// The main error type for orchestrator operations.
#[derive(Debug, Error)]
pub enum ArtifactflowError {
    /// The run request failed validation before any stage ran.
    #[error("{0}")]
    Request(#[from] RequestValidationError),

    /// A stage failed permanently, or exhausted its transient retries.
    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        /// The stage that was active.
        stage: StageName,
        /// The underlying stage error.
        #[source]
        source: StageError,
    },

    /// No implementation is registered for a stage the control flow needs.
    #[error("No stage registered for '{0}'")]
    UnknownStage(StageName),

    /// A stage returned an output variant that belongs to another stage.
    #[error("Stage '{stage}' returned output for '{actual}'")]
    UnexpectedOutput {
        /// The stage that was dispatched.
        stage: StageName,
        /// The stage the returned output belongs to.
        actual: StageName,
    },

    /// The caller cancelled the run.
    #[error("Run cancelled: {reason}")]
    Cancelled {
        /// The stage that was active, if any.
        stage: Option<StageName>,
        /// The cancellation reason.
        reason: String,
    },

    /// The configured run deadline elapsed.
    #[error("Run deadline of {}ms exceeded", timeout.as_millis())]
    DeadlineExceeded {
        /// The stage that was active, if any.
        stage: Option<StageName>,
        /// The configured run timeout.
        timeout: Duration,
    },

    /// The orchestrator configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArtifactflowError {
    /// Wraps a stage error with the name of the stage that raised it.
    #[must_use]
    pub fn stage(stage: StageName, source: StageError) -> Self {
        Self::Stage { stage, source }
    }

    /// Returns the stage that was active when the error occurred.
    #[must_use]
    pub fn failed_stage(&self) -> Option<StageName> {
        match self {
            Self::Stage { stage, .. } | Self::UnexpectedOutput { stage, .. } => Some(*stage),
            Self::UnknownStage(stage) => Some(*stage),
            Self::Cancelled { stage, .. } | Self::DeadlineExceeded { stage, .. } => *stage,
            Self::Request(_) | Self::Config(_) | Self::Serialization(_) | Self::Io(_) => None,
        }
    }

    /// Returns the human-readable message reported in a failed run result.
    ///
    /// Stage failures report the stage's own message; the stage name is
    /// carried separately.
    #[must_use]
    pub fn run_message(&self) -> String {
        match self {
            Self::Stage { source, .. } => source.message.clone(),
            other => other.to_string(),
        }
    }
}

/// Error raised when a run request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestValidationError {
    /// The source text was empty or whitespace only.
    #[error("Source text must not be empty")]
    EmptySource,

    /// The source text exceeded the length ceiling for its shape.
    #[error("Source text is {length} characters; the limit for {shape} input is {limit}")]
    SourceTooLong {
        /// Length of the submitted source text in characters.
        length: usize,
        /// The ceiling that applied.
        limit: usize,
        /// Which ceiling applied ("structured" or "free-form").
        shape: &'static str,
    },

    /// The run id was empty.
    #[error("Run id must not be empty")]
    EmptyRunId,
}

/// Error raised by a stage implementation.
///
/// Stages report failures as plain messages; whether a failure is worth
/// retrying is decided by the retry policy from the message alone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StageError {
    /// The error message.
    pub message: String,
}

impl StageError {
    /// Creates a new stage error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Classifies the error as transient or permanent.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        ErrorClass::classify(&self.message)
    }

    /// Returns true if the retry policy would retry this error.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.class() == ErrorClass::Transient
    }
}

impl From<CompletionError> for StageError {
    fn from(err: CompletionError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<serde_json::Error> for StageError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Malformed stage payload: {err}"))
    }
}

/// Errors returned by the AI completion port.
///
/// The display text of each variant contains the marker the retry policy
/// looks for, so the classification survives conversion into [`StageError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    /// Connection-level failure.
    #[error("Completion network error: {0}")]
    Network(String),

    /// The request timed out.
    #[error("Completion request timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The provider throttled the request (HTTP 429).
    #[error("Completion rate limit exceeded (HTTP 429): {0}")]
    RateLimited(String),

    /// The provider answered with a non-success status.
    #[error("Completion provider returned HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The provider answered successfully but the body was unusable.
    #[error("Completion response malformed: {0}")]
    MalformedResponse(String),

    /// Misconfiguration or other provider-side refusal.
    #[error("Completion provider error: {0}")]
    Provider(String),
}

/// Error raised by an external quality scorer.
#[derive(Debug, Clone, Error)]
#[error("Quality scoring failed: {0}")]
pub struct ScoreError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_classification() {
        assert!(StageError::new("network unreachable").is_transient());
        assert!(StageError::new("Request timeout").is_transient());
        assert!(!StageError::new("invalid spec").is_transient());
    }

    #[test]
    fn test_completion_error_keeps_transient_markers() {
        let transient = [
            CompletionError::Network("connection reset".to_string()),
            CompletionError::Timeout(Duration::from_secs(30)),
            CompletionError::RateLimited("slow down".to_string()),
            CompletionError::Http {
                status: 502,
                body: "bad gateway".to_string(),
            },
            CompletionError::Http {
                status: 503,
                body: String::new(),
            },
        ];
        for err in transient {
            let stage_err = StageError::from(err.clone());
            assert!(stage_err.is_transient(), "expected transient: {err}");
        }

        let permanent = [
            CompletionError::Http {
                status: 400,
                body: "bad request".to_string(),
            },
            CompletionError::Provider("missing api key".to_string()),
            CompletionError::MalformedResponse("no text".to_string()),
        ];
        for err in permanent {
            let stage_err = StageError::from(err.clone());
            assert!(!stage_err.is_transient(), "expected permanent: {err}");
        }
    }

    #[test]
    fn test_failed_stage_and_run_message() {
        let err = ArtifactflowError::stage(
            StageName::ArtifactBuilding,
            StageError::new("template rendering exploded"),
        );
        assert_eq!(err.failed_stage(), Some(StageName::ArtifactBuilding));
        assert_eq!(err.run_message(), "template rendering exploded");

        let err = ArtifactflowError::from(RequestValidationError::EmptySource);
        assert_eq!(err.failed_stage(), None);
        assert_eq!(err.run_message(), "Source text must not be empty");
    }

    #[test]
    fn test_request_validation_error_display() {
        let err = RequestValidationError::SourceTooLong {
            length: 12_000,
            limit: 10_000,
            shape: "free-form",
        };
        assert_eq!(
            err.to_string(),
            "Source text is 12000 characters; the limit for free-form input is 10000"
        );
    }
}
