//! Core domain model types for artifactflow.
//!
//! This module contains the fundamental types used throughout the crate:
//! - Stage names and run status enums
//! - Stage input/output sum types and their payloads
//! - The generated artifact and structured pipeline events

mod artifact;
mod event;
mod output;
#[cfg(test)]
mod output_tests;
pub mod payloads;
mod status;

pub use artifact::Artifact;
pub use event::{EventKind, PipelineEvent};
pub use output::{StageInput, StageOutput};
pub use payloads::{
    AnalysisRequest, AudienceProfile, AuditFinding, AuditReport, AuditSeverity, BuildRequest,
    ExtractionOutcome, ExtractionRequest, GradeRequest, GradeResult, Microcopy, RevisionRequest,
    SourceAnalysis, SourceSummary, SpecInput, Specification, TemplateChoice, WorkedExample,
};
pub use status::{RevisionOutcome, RunStatus, StageName};
