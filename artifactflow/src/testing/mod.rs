//! Testing utilities for artifactflow runs.
//!
//! This module provides:
//! - Scripted, failing and slow stages
//! - A recording quality scorer
//! - Sample payloads, builder contexts and a happy-path registry

mod fixtures;
mod mocks;

pub use fixtures::{
    bare_html, happy_path_stages, sample_builder_context, sample_designed_specification,
    sample_specification, satisfying_html, structured_source, SAMPLE_QUOTE,
};
pub use mocks::{FailingStage, RecordingScorer, ScriptedStage, SlowStage};
