//! Stages backed by the AI completion port.

use super::ports::{CompletionPort, CompletionRequest, CompletionResponse};
use super::Stage;
use crate::context::PipelineContext;
use crate::core::{StageInput, StageName, StageOutput};
use crate::errors::StageError;
use async_trait::async_trait;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

type PromptFn =
    dyn Fn(&StageInput, &PipelineContext) -> Result<CompletionRequest, StageError> + Send + Sync;
type ParseFn = dyn Fn(CompletionResponse) -> Result<StageOutput, StageError> + Send + Sync;

/// A stage that renders a prompt, calls the completion port and parses the
/// reply into a typed output.
///
/// The prompt text itself is supplied by the caller.
pub struct CompletionStage {
    name: StageName,
    port: Arc<dyn CompletionPort>,
    prompt: Box<PromptFn>,
    parse: Box<ParseFn>,
}

impl CompletionStage {
    /// Creates a completion-backed stage.
    pub fn new<P, R>(name: StageName, port: Arc<dyn CompletionPort>, prompt: P, parse: R) -> Self
    where
        P: Fn(&StageInput, &PipelineContext) -> Result<CompletionRequest, StageError>
            + Send
            + Sync
            + 'static,
        R: Fn(CompletionResponse) -> Result<StageOutput, StageError> + Send + Sync + 'static,
    {
        Self {
            name,
            port,
            prompt: Box::new(prompt),
            parse: Box::new(parse),
        }
    }
}

impl fmt::Debug for CompletionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionStage")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Stage for CompletionStage {
    fn name(&self) -> StageName {
        self.name
    }

    async fn execute(
        &self,
        input: StageInput,
        ctx: &PipelineContext,
    ) -> Result<StageOutput, StageError> {
        if input.stage_name() != self.name {
            return Err(StageError::new(format!(
                "{} received input addressed to {}",
                self.name,
                input.stage_name()
            )));
        }

        let request = (self.prompt)(&input, ctx)?;
        let response = self.port.complete(request).await?;
        debug!(
            run_id = %ctx.run_id(),
            stage = %self.name,
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Completion received"
        );
        (self.parse)(response)
    }
}

fn fence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)```[A-Za-z0-9_-]*\s*\n(.*?)```").expect("fence pattern is valid")
    })
}

/// Extracts and deserializes a JSON payload from completion text.
///
/// Accepts bare JSON, a fenced code block, or JSON surrounded by prose.
pub fn parse_json_content<T: DeserializeOwned>(content: &str) -> Result<T, StageError> {
    let trimmed = content.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    if let Some(captures) = fence_pattern().captures(trimmed) {
        if let Some(body) = captures.get(1) {
            return serde_json::from_str(body.as_str().trim()).map_err(StageError::from);
        }
    }

    let start = trimmed.find(&['{', '['][..]);
    let end = trimmed.rfind(&['}', ']'][..]);
    match (start, end) {
        (Some(start), Some(end)) if end > start => {
            serde_json::from_str(&trimmed[start..=end]).map_err(StageError::from)
        }
        _ => Err(StageError::new(
            "Malformed stage payload: completion contained no JSON",
        )),
    }
}
