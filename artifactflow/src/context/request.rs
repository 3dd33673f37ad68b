//! Run requests and their admission checks.

use crate::errors::RequestValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Default ceiling for free-form requests, in characters.
pub const DEFAULT_MAX_FREEFORM_CHARS: usize = 10_000;
/// Default ceiling for structured source material, in characters.
pub const DEFAULT_MAX_STRUCTURED_CHARS: usize = 200_000;
/// Default number of distinct structural markers that make source structured.
pub const DEFAULT_STRUCTURED_MARKER_THRESHOLD: usize = 3;

const STRUCTURAL_MARKERS: [&str; 8] = [
    r"(?im)^\s*(module|lesson|chapter|unit|section)\s+\d+",
    r"(?im)^\s*step\s+\d+\s*[:.)-]",
    r"(?m)^\s*\d{1,2}[.)]\s+\S",
    r"(?m)^#{1,6}\s+\S",
    r"(?m)^\s*[-*\u{2022}]\s+\S",
    r"(?i)\b(learning objectives?|key takeaways?|action items?)\b",
    r"(?i)\b(framework|methodology)\b",
    r"(?i)\b(transcript|curriculum|workbook)\b",
];

fn marker_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        STRUCTURAL_MARKERS
            .iter()
            .map(|p| Regex::new(p).expect("structural marker pattern is valid"))
            .collect()
    })
}

/// Counts how many distinct structural markers the text matches.
#[must_use]
pub fn structural_marker_count(text: &str) -> usize {
    marker_patterns().iter().filter(|re| re.is_match(text)).count()
}

/// The content shape of a run's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceShape {
    /// A free-form natural-language request.
    FreeForm,
    /// Course-derived or otherwise structured source material.
    Structured,
}

impl SourceShape {
    /// Returns the shape name used in messages.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FreeForm => "free-form",
            Self::Structured => "structured",
        }
    }

    /// Returns true for structured source material.
    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured)
    }
}

/// Admission limits for run requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestLimits {
    /// Ceiling for free-form requests.
    pub max_freeform_chars: usize,
    /// Ceiling for structured source material.
    pub max_structured_chars: usize,
    /// Distinct markers needed to treat source as structured.
    pub structured_marker_threshold: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_freeform_chars: DEFAULT_MAX_FREEFORM_CHARS,
            max_structured_chars: DEFAULT_MAX_STRUCTURED_CHARS,
            structured_marker_threshold: DEFAULT_STRUCTURED_MARKER_THRESHOLD,
        }
    }
}

impl RequestLimits {
    /// Classifies source text by shape.
    #[must_use]
    pub fn classify(&self, text: &str) -> SourceShape {
        if structural_marker_count(text) >= self.structured_marker_threshold {
            SourceShape::Structured
        } else {
            SourceShape::FreeForm
        }
    }

    /// Returns the ceiling for a shape.
    #[must_use]
    pub fn limit_for(&self, shape: SourceShape) -> usize {
        match shape {
            SourceShape::FreeForm => self.max_freeform_chars,
            SourceShape::Structured => self.max_structured_chars,
        }
    }
}

/// Immutable input to one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    /// Identifier of the run.
    pub run_id: String,
    /// The request text or source material.
    pub source_text: String,
    /// Template to build on, which skips template selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_hint: Option<String>,
    /// Skip template selection even without a hint.
    #[serde(default, alias = "skipOptionalStage")]
    pub skip_template_selection: bool,
}

impl RunRequest {
    /// Creates a request with a generated run id.
    #[must_use]
    pub fn new(source_text: impl Into<String>) -> Self {
        Self {
            run_id: crate::utils::generate_id(),
            source_text: source_text.into(),
            template_hint: None,
            skip_template_selection: false,
        }
    }

    /// Sets the run id.
    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    /// Sets the template hint.
    #[must_use]
    pub fn with_template_hint(mut self, template_id: impl Into<String>) -> Self {
        self.template_hint = Some(template_id.into());
        self
    }

    /// Opts out of template selection.
    #[must_use]
    pub fn skip_template_selection(mut self) -> Self {
        self.skip_template_selection = true;
        self
    }

    /// Returns true if the orchestrator should run template selection.
    #[must_use]
    pub fn wants_template_selection(&self) -> bool {
        self.template_hint.is_none() && !self.skip_template_selection
    }

    /// Validates the request and returns the shape of its source text.
    pub fn validate(&self, limits: &RequestLimits) -> Result<SourceShape, RequestValidationError> {
        if self.run_id.trim().is_empty() {
            return Err(RequestValidationError::EmptyRunId);
        }
        if self.source_text.trim().is_empty() {
            return Err(RequestValidationError::EmptySource);
        }

        let shape = limits.classify(&self.source_text);
        let length = self.source_text.chars().count();
        let limit = limits.limit_for(shape);
        if length > limit {
            return Err(RequestValidationError::SourceTooLong {
                length,
                limit,
                shape: shape.as_str(),
            });
        }
        Ok(shape)
    }
}
