//! Run requests and the per-run pipeline context.
//!
//! This module provides:
//! - The immutable [`RunRequest`] and its admission checks
//! - The mutable [`PipelineContext`] threaded through every stage call

#[cfg(test)]
mod context_tests;
mod pipeline;
mod request;

pub use pipeline::{PipelineContext, DEFAULT_MAX_REVISIONS};
pub use request::{
    structural_marker_count, RequestLimits, RunRequest, SourceShape, DEFAULT_MAX_FREEFORM_CHARS,
    DEFAULT_MAX_STRUCTURED_CHARS, DEFAULT_STRUCTURED_MARKER_THRESHOLD,
};
