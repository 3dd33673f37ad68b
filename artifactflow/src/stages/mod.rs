//! Stage trait and implementations.
//!
//! A stage is one named unit of work. The orchestrator only depends on
//! [`Stage::execute`]; the variant-specific payloads travel inside
//! [`StageInput`] and [`StageOutput`].

mod completion;
#[cfg(feature = "http")]
mod http;
mod ports;
mod registry;

pub use completion::{parse_json_content, CompletionStage};
#[cfg(feature = "http")]
pub use http::{HttpCompletionClient, HttpCompletionConfig};
pub use ports::{
    CompletionPort, CompletionRequest, CompletionResponse, CompletionUsage, NoOpQualityScorer,
    QualityScore, QualityScorer, DEFAULT_MAX_TOKENS,
};
#[cfg(test)]
pub use ports::MockCompletionPort;
pub use registry::{StageRegistry, StageRegistryBuilder, REQUIRED_STAGES};

use crate::context::PipelineContext;
use crate::core::{StageInput, StageName, StageOutput};
use crate::errors::StageError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::future::Future;
use std::marker::PhantomData;

/// A pipeline stage.
///
/// Stages must tolerate being called several times in the same run with
/// different inputs; the grading and building stages routinely are.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the stage this implementation serves.
    fn name(&self) -> StageName;

    /// Executes the stage.
    ///
    /// The context is read-only here: stages may inspect earlier outputs but
    /// only the orchestrator records new ones.
    async fn execute(
        &self,
        input: StageInput,
        ctx: &PipelineContext,
    ) -> Result<StageOutput, StageError>;
}

/// A stage backed by a synchronous function.
pub struct FnStage<F>
where
    F: Fn(StageInput, &PipelineContext) -> Result<StageOutput, StageError> + Send + Sync,
{
    name: StageName,
    func: F,
}

impl<F> FnStage<F>
where
    F: Fn(StageInput, &PipelineContext) -> Result<StageOutput, StageError> + Send + Sync,
{
    /// Creates a new function-based stage.
    pub fn new(name: StageName, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Debug for FnStage<F>
where
    F: Fn(StageInput, &PipelineContext) -> Result<StageOutput, StageError> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStage").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F> Stage for FnStage<F>
where
    F: Fn(StageInput, &PipelineContext) -> Result<StageOutput, StageError> + Send + Sync,
{
    fn name(&self) -> StageName {
        self.name
    }

    async fn execute(
        &self,
        input: StageInput,
        ctx: &PipelineContext,
    ) -> Result<StageOutput, StageError> {
        (self.func)(input, ctx)
    }
}

/// A stage backed by an async function of its input.
pub struct AsyncFnStage<F, Fut>
where
    F: Fn(StageInput) -> Fut + Send + Sync,
    Fut: Future<Output = Result<StageOutput, StageError>> + Send,
{
    name: StageName,
    func: F,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> AsyncFnStage<F, Fut>
where
    F: Fn(StageInput) -> Fut + Send + Sync,
    Fut: Future<Output = Result<StageOutput, StageError>> + Send,
{
    /// Creates a new async function-based stage.
    pub fn new(name: StageName, func: F) -> Self {
        Self {
            name,
            func,
            _phantom: PhantomData,
        }
    }
}

impl<F, Fut> Debug for AsyncFnStage<F, Fut>
where
    F: Fn(StageInput) -> Fut + Send + Sync,
    Fut: Future<Output = Result<StageOutput, StageError>> + Send,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncFnStage").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F, Fut> Stage for AsyncFnStage<F, Fut>
where
    F: Fn(StageInput) -> Fut + Send + Sync,
    Fut: Future<Output = Result<StageOutput, StageError>> + Send,
{
    fn name(&self) -> StageName {
        self.name
    }

    async fn execute(
        &self,
        input: StageInput,
        _ctx: &PipelineContext,
    ) -> Result<StageOutput, StageError> {
        (self.func)(input).await
    }
}
