//! Validation results and issue codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which point of the pipeline a validation ran at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStage {
    /// The builder context extracted from source analysis.
    Extraction,
    /// The designed specification.
    Design,
    /// The generated artifact.
    Output,
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extraction => write!(f, "extraction"),
            Self::Design => write!(f, "design"),
            Self::Output => write!(f, "output"),
        }
    }
}

/// Machine-readable issue codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    /// A framework item's label is absent from the artifact.
    FrameworkItemMissingInHtml,
    /// A term the methodology foregrounds is absent from the artifact.
    CriticalTerminologyMissing,
    /// An incidental term is absent from the artifact.
    TerminologyGenericized,
    /// The expert quote is absent from the artifact.
    ExpertQuoteMissingInHtml,
    /// A framework item has an empty label.
    FrameworkItemLabelEmpty,
    /// Framework item indices are not sequential from 1.
    FrameworkItemIndexGap,
    /// A terminology entry has an empty term.
    TerminologyTermEmpty,
    /// The expert quote has no text.
    ExpertQuoteEmpty,
    /// A framework item's label is absent from the designed specification.
    FrameworkItemMissingInDesign,
    /// The designed specification does not mention the calculation.
    CalculationMissingInDesign,
}

impl IssueCode {
    /// Returns the wire form of the code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FrameworkItemMissingInHtml => "FRAMEWORK_ITEM_MISSING_IN_HTML",
            Self::CriticalTerminologyMissing => "CRITICAL_TERMINOLOGY_MISSING",
            Self::TerminologyGenericized => "TERMINOLOGY_GENERICIZED",
            Self::ExpertQuoteMissingInHtml => "EXPERT_QUOTE_MISSING_IN_HTML",
            Self::FrameworkItemLabelEmpty => "FRAMEWORK_ITEM_LABEL_EMPTY",
            Self::FrameworkItemIndexGap => "FRAMEWORK_ITEM_INDEX_GAP",
            Self::TerminologyTermEmpty => "TERMINOLOGY_TERM_EMPTY",
            Self::ExpertQuoteEmpty => "EXPERT_QUOTE_EMPTY",
            Self::FrameworkItemMissingInDesign => "FRAMEWORK_ITEM_MISSING_IN_DESIGN",
            Self::CalculationMissingInDesign => "CALCULATION_MISSING_IN_DESIGN",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Issue code.
    pub code: IssueCode,
    /// Human-readable description.
    pub message: String,
    /// Path of the contract field the issue is about.
    pub field: String,
    /// The content that was expected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// What was found instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl ValidationIssue {
    /// Creates a new issue.
    #[must_use]
    pub fn new(code: IssueCode, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: field.into(),
            expected: None,
            actual: None,
        }
    }

    /// Sets the expected content.
    #[must_use]
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Sets the actual content.
    #[must_use]
    pub fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }
}

/// The outcome of one validation call.
///
/// `passed` is true exactly when there are no blocking errors; warnings
/// never affect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Where the validation ran.
    pub stage: ValidationStage,
    /// Whether there were no blocking errors.
    pub passed: bool,
    /// Blocking errors.
    pub errors: Vec<ValidationIssue>,
    /// Advisory warnings.
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Creates a result from collected errors and warnings.
    #[must_use]
    pub fn from_issues(
        stage: ValidationStage,
        errors: Vec<ValidationIssue>,
        warnings: Vec<ValidationIssue>,
    ) -> Self {
        Self {
            stage,
            passed: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Creates a passing result with no findings.
    #[must_use]
    pub fn passing(stage: ValidationStage) -> Self {
        Self::from_issues(stage, Vec::new(), Vec::new())
    }

    /// Counts errors with the given code.
    #[must_use]
    pub fn error_count(&self, code: IssueCode) -> usize {
        self.errors.iter().filter(|i| i.code == code).count()
    }

    /// Counts warnings with the given code.
    #[must_use]
    pub fn warning_count(&self, code: IssueCode) -> usize {
        self.warnings.iter().filter(|i| i.code == code).count()
    }

    /// Returns true if there are neither errors nor warnings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passed_tracks_errors_only() {
        let warning = ValidationIssue::new(IssueCode::TerminologyGenericized, "terminology[0]", "w");
        let result = ValidationResult::from_issues(ValidationStage::Output, Vec::new(), vec![warning]);
        assert!(result.passed);
        assert!(!result.is_clean());

        let error = ValidationIssue::new(IssueCode::ExpertQuoteMissingInHtml, "expertQuote", "e");
        let result = ValidationResult::from_issues(ValidationStage::Output, vec![error], Vec::new());
        assert!(!result.passed);
        assert_eq!(result.error_count(IssueCode::ExpertQuoteMissingInHtml), 1);
    }

    #[test]
    fn test_issue_code_wire_form() {
        let json = serde_json::to_string(&IssueCode::FrameworkItemMissingInHtml).unwrap();
        assert_eq!(json, r#""FRAMEWORK_ITEM_MISSING_IN_HTML""#);
        assert_eq!(IssueCode::CriticalTerminologyMissing.to_string(), "CRITICAL_TERMINOLOGY_MISSING");
    }

    #[test]
    fn test_issue_serialization_skips_empty_fields() {
        let issue = ValidationIssue::new(IssueCode::ExpertQuoteEmpty, "expertQuote.quote", "empty")
            .with_expected("non-empty quote");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["expected"], "non-empty quote");
        assert!(json.get("actual").is_none());
        assert_eq!(ValidationStage::Design.to_string(), "design");
    }
}
