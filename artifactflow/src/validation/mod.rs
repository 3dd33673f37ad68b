//! Required-content validation.
//!
//! The [`BuilderContext`] describes content a generated artifact must carry.
//! [`OutputValidator`] checks artifacts against it and [`fix_instructions`]
//! turns blocking findings into directives for the next build attempt.

mod contract;
mod normalize;
mod output;
mod result;
mod structure;

pub use contract::{BuilderContext, Calculation, ExpertQuote, FrameworkItem, TermUsage};
pub use normalize::{char_prefix, normalize_text};
pub use output::{fix_instructions, OutputValidator, DEFAULT_QUOTE_PREFIX_CHARS};
pub use result::{IssueCode, ValidationIssue, ValidationResult, ValidationStage};
pub use structure::{validate_design, validate_extraction};
