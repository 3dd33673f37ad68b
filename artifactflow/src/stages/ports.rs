//! External collaborators the orchestrator calls but does not implement.

use crate::errors::{CompletionError, ScoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default completion budget in output tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// A request to the AI completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    /// System prompt.
    pub system_prompt: String,
    /// User prompt.
    pub user_prompt: String,
    /// Maximum output tokens.
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Creates a request with the default token budget.
    #[must_use]
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Sets the token budget.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Token accounting for one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionUsage {
    /// Prompt tokens.
    pub input_tokens: u64,
    /// Generated tokens.
    pub output_tokens: u64,
}

/// A completion returned by the AI completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    /// Generated text.
    pub content: String,
    /// Model that produced the text.
    pub model: String,
    /// Token usage.
    #[serde(default)]
    pub usage: CompletionUsage,
}

/// The AI completion service.
///
/// Implementations report failures as [`CompletionError`] and never retry;
/// the retry policy wrapping each stage call owns retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Runs one completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, CompletionError>;
}

/// A quality score produced by an external scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityScore {
    /// The run the artifact came from.
    pub run_id: String,
    /// The scored artifact.
    pub artifact_id: String,
    /// Overall score.
    pub score: f64,
}

/// Scores finished artifacts outside the run.
///
/// Scoring is fire-and-forget: its result and failures never affect the
/// run's own outcome.
#[async_trait]
pub trait QualityScorer: Send + Sync {
    /// Scores an artifact.
    async fn score(
        &self,
        run_id: &str,
        artifact_id: &str,
        artifact_text: &str,
    ) -> Result<QualityScore, ScoreError>;
}

/// A scorer that accepts every artifact with a zero score.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpQualityScorer;

#[async_trait]
impl QualityScorer for NoOpQualityScorer {
    async fn score(
        &self,
        run_id: &str,
        artifact_id: &str,
        _artifact_text: &str,
    ) -> Result<QualityScore, ScoreError> {
        Ok(QualityScore {
            run_id: run_id.to_string(),
            artifact_id: artifact_id.to_string(),
            score: 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_defaults() {
        let request = CompletionRequest::new("system", "user");
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(request.with_max_tokens(512).max_tokens, 512);
    }

    #[test]
    fn test_completion_response_wire_shape() {
        let json = serde_json::json!({
            "content": "{}",
            "model": "claude-sonnet",
            "usage": {"inputTokens": 10, "outputTokens": 4}
        });
        let response: CompletionResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.usage.output_tokens, 4);
    }

    #[tokio::test]
    async fn test_noop_scorer() {
        let score = NoOpQualityScorer.score("run-1", "artifact-1", "<p/>").await.unwrap();
        assert_eq!(score.artifact_id, "artifact-1");
    }
}
