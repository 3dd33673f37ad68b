//! Run orchestration.
//!
//! This module provides:
//! - The retry policy and transient error classification
//! - The stage executor and the run guard (cancellation and deadline)
//! - The bounded output-validation and quality-revision loops
//! - The orchestrator, its configuration and the run result

mod build;
mod config;
mod executor;
mod guard;
mod orchestrator;
mod result;
mod retry;
mod revision;

pub use build::{run_build_loop, BuildLoopResult};
pub use config::{
    OrchestratorConfig, DEFAULT_MAX_OUTPUT_FIX_ATTEMPTS, DEFAULT_SUMMARIZE_THRESHOLD_CHARS,
};
pub use executor::StageExecutor;
pub use guard::RunGuard;
pub use orchestrator::Orchestrator;
pub use result::{Clarification, RunError, RunResult, Timing};
pub use retry::{
    with_retry, BackoffStrategy, ErrorClass, JitterStrategy, RetryConfig, RetryDecision,
    RetryNotice,
};
pub use revision::{run_revision_loop, RevisionLoopResult};
