//! Orchestrator configuration.

use super::retry::RetryConfig;
use crate::context::{RequestLimits, DEFAULT_MAX_REVISIONS};
use crate::errors::ArtifactflowError;
use crate::validation::DEFAULT_QUOTE_PREFIX_CHARS;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default extra build attempts after a failed output validation.
pub const DEFAULT_MAX_OUTPUT_FIX_ATTEMPTS: u32 = 2;

/// Structured source above this many characters is summarized first.
pub const DEFAULT_SUMMARIZE_THRESHOLD_CHARS: usize = 40_000;

/// Configuration for an [`Orchestrator`](super::Orchestrator).
///
/// Every field has a default, so a partial JSON document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Retry policy applied to every stage call.
    pub retry: RetryConfig,
    /// Revision budget of the quality loop.
    pub max_revisions: u32,
    /// Extra build attempts when output validation fails.
    pub max_output_fix_attempts: u32,
    /// Request admission limits.
    pub limits: RequestLimits,
    /// Structured source length above which it is summarized first.
    pub summarize_threshold_chars: usize,
    /// Length of the expert quote prefix the artifact must contain.
    pub quote_prefix_chars: usize,
    /// Run-wide deadline in milliseconds; none by default.
    pub run_timeout_ms: Option<u64>,
    /// Whether the final artifact is handed to the quality scorer.
    pub score_quality: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            max_revisions: DEFAULT_MAX_REVISIONS,
            max_output_fix_attempts: DEFAULT_MAX_OUTPUT_FIX_ATTEMPTS,
            limits: RequestLimits::default(),
            summarize_threshold_chars: DEFAULT_SUMMARIZE_THRESHOLD_CHARS,
            quote_prefix_chars: DEFAULT_QUOTE_PREFIX_CHARS,
            run_timeout_ms: None,
            score_quality: true,
        }
    }
}

impl OrchestratorConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON configuration document and validates it.
    pub fn from_json_str(json: &str) -> Result<Self, ArtifactflowError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file and validates it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ArtifactflowError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the revision budget.
    #[must_use]
    pub fn with_max_revisions(mut self, max_revisions: u32) -> Self {
        self.max_revisions = max_revisions;
        self
    }

    /// Sets the extra build attempts.
    #[must_use]
    pub fn with_max_output_fix_attempts(mut self, attempts: u32) -> Self {
        self.max_output_fix_attempts = attempts;
        self
    }

    /// Sets the request limits.
    #[must_use]
    pub fn with_limits(mut self, limits: RequestLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the summarization threshold.
    #[must_use]
    pub fn with_summarize_threshold_chars(mut self, chars: usize) -> Self {
        self.summarize_threshold_chars = chars;
        self
    }

    /// Sets the quote prefix length.
    #[must_use]
    pub fn with_quote_prefix_chars(mut self, chars: usize) -> Self {
        self.quote_prefix_chars = chars;
        self
    }

    /// Sets the run deadline.
    #[must_use]
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Enables or disables quality scoring.
    #[must_use]
    pub fn with_score_quality(mut self, enabled: bool) -> Self {
        self.score_quality = enabled;
        self
    }

    /// Returns the run deadline, if one is configured.
    #[must_use]
    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_ms.map(Duration::from_millis)
    }

    /// Rejects values the orchestrator cannot work with.
    pub fn validate(&self) -> Result<(), ArtifactflowError> {
        let invalid = |msg: &str| Err(ArtifactflowError::Config(msg.to_string()));
        if self.retry.max_attempts == 0 {
            return invalid("retry.max_attempts must be at least 1");
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return invalid("retry.base_delay_ms must not exceed retry.max_delay_ms");
        }
        if self.limits.max_freeform_chars == 0 || self.limits.max_structured_chars == 0 {
            return invalid("request limits must be positive");
        }
        if self.limits.structured_marker_threshold == 0 {
            return invalid("limits.structured_marker_threshold must be at least 1");
        }
        if self.summarize_threshold_chars == 0 {
            return invalid("summarize_threshold_chars must be positive");
        }
        if self.quote_prefix_chars == 0 {
            return invalid("quote_prefix_chars must be positive");
        }
        if self.run_timeout_ms == Some(0) {
            return invalid("run_timeout_ms must be positive when set");
        }
        Ok(())
    }
}
