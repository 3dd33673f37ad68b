//! # Artifactflow
//!
//! Orchestration core for generating interactive decision-support artifacts
//! with a sequence of LLM-backed stages.
//!
//! Artifactflow provides:
//!
//! - **A fixed stage sequence**: extraction or design, enrichment, template
//!   selection, building, auditing, grading and revision
//! - **Uniform stage execution**: every call is timed, reported as events and
//!   retried on transient failures
//! - **Output validation**: generated artifacts are checked against a
//!   required-content contract and regenerated with fix instructions
//! - **Bounded quality revision**: grading and revision repeat until the
//!   artifact passes or the revision budget is spent
//! - **Cancellation and deadlines**: callers can abort a run in flight
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use artifactflow::prelude::*;
//!
//! let registry = StageRegistry::builder()
//!     .register(extraction_stage)
//!     .register(builder_stage)
//!     // ... one stage per required stage name
//!     .build();
//!
//! let orchestrator = Orchestrator::new(registry, OrchestratorConfig::default())?;
//! let result = orchestrator.run(RunRequest::new("build me a BMI calculator")).await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod context;
pub mod core;
pub mod errors;
pub mod events;
pub mod observability;
pub mod pipeline;
pub mod stages;
pub mod testing;
pub mod utils;
pub mod validation;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::context::{PipelineContext, RequestLimits, RunRequest, SourceShape};
    pub use crate::core::{
        Artifact, BuildRequest, EventKind, ExtractionOutcome, GradeResult, PipelineEvent,
        RevisionOutcome, RunStatus, Specification, StageInput, StageName, StageOutput,
    };
    pub use crate::errors::{
        ArtifactflowError, CompletionError, RequestValidationError, StageError,
    };
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::observability::{init_tracing, LogFormat};
    pub use crate::pipeline::{
        Orchestrator, OrchestratorConfig, RetryConfig, RunError, RunResult, Timing,
    };
    pub use crate::stages::{
        CompletionPort, CompletionStage, FnStage, QualityScorer, Stage, StageRegistry,
    };
    pub use crate::validation::{BuilderContext, OutputValidator, ValidationResult};
}
