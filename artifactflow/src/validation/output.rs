//! Output validation against the required-content contract.

use super::contract::BuilderContext;
use super::normalize::{char_prefix, normalize_text, visible_text, Haystack};
use super::result::{IssueCode, ValidationIssue, ValidationResult, ValidationStage};
use serde::{Deserialize, Serialize};

/// Default number of leading quote characters that must appear verbatim.
pub const DEFAULT_QUOTE_PREFIX_CHARS: usize = 50;

/// Checks generated artifacts against a [`BuilderContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputValidator {
    /// How many leading characters of the expert quote must appear.
    pub quote_prefix_chars: usize,
}

impl Default for OutputValidator {
    fn default() -> Self {
        Self {
            quote_prefix_chars: DEFAULT_QUOTE_PREFIX_CHARS,
        }
    }
}

impl OutputValidator {
    /// Creates a validator with the default quote window.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the quote window.
    #[must_use]
    pub fn with_quote_prefix_chars(mut self, chars: usize) -> Self {
        self.quote_prefix_chars = chars.max(1);
        self
    }

    /// Validates an artifact.
    ///
    /// Missing framework item labels, missing critical terms and a missing
    /// expert quote are blocking errors. Missing non-critical terms are
    /// warnings. Labels and terms match regardless of case, in visible text
    /// or in attribute values; the quote prefix must keep its case.
    #[must_use]
    pub fn validate(&self, artifact: &str, contract: &BuilderContext) -> ValidationResult {
        let haystack = Haystack::new(artifact);
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for (position, item) in contract.framework_items.iter().enumerate() {
            if !label_present(&haystack, &item.label) {
                errors.push(
                    ValidationIssue::new(
                        IssueCode::FrameworkItemMissingInHtml,
                        format!("frameworkItems[{position}].label"),
                        format!(
                            "Framework item {} \"{}\" does not appear in the artifact",
                            item.index, item.label
                        ),
                    )
                    .with_expected(item.label.trim())
                    .with_actual("not found"),
                );
            }
        }

        for (position, usage) in contract.terminology.iter().enumerate() {
            let term = normalize_text(&usage.term);
            if term.is_empty() || haystack.contains_folded(&term) {
                continue;
            }
            let field = format!("terminology[{position}].term");
            if contract.is_critical_term(&usage.term) {
                errors.push(
                    ValidationIssue::new(
                        IssueCode::CriticalTerminologyMissing,
                        field,
                        format!(
                            "Critical term \"{}\" from the framework is missing from the artifact",
                            usage.term
                        ),
                    )
                    .with_expected(usage.term.trim())
                    .with_actual("not found"),
                );
            } else {
                warnings.push(
                    ValidationIssue::new(
                        IssueCode::TerminologyGenericized,
                        field,
                        format!(
                            "Term \"{}\" was not used verbatim and may have been paraphrased",
                            usage.term
                        ),
                    )
                    .with_expected(usage.term.trim())
                    .with_actual("not found"),
                );
            }
        }

        if let Some(quote) = &contract.expert_quote {
            let expected = visible_text(&quote.quote);
            let prefix = char_prefix(&expected, self.quote_prefix_chars);
            if !prefix.is_empty() && !haystack.contains_exact(prefix) {
                errors.push(
                    ValidationIssue::new(
                        IssueCode::ExpertQuoteMissingInHtml,
                        "expertQuote.quote",
                        format!("Expert quote from {} does not appear verbatim", quote.source),
                    )
                    .with_expected(quote_prefix(&quote.quote, self.quote_prefix_chars))
                    .with_actual("not found"),
                );
            }
        }

        ValidationResult::from_issues(ValidationStage::Output, errors, warnings)
    }
}

/// Matches a label case-insensitively, tolerating a "prefix: label" framing.
///
/// The full label matches, and so does the text after its last colon.
fn label_present(haystack: &Haystack, label: &str) -> bool {
    let full = normalize_text(label);
    if full.is_empty() || haystack.contains_folded(&full) {
        return true;
    }
    match full.rsplit_once(':') {
        Some((_, tail)) => {
            let tail = tail.trim();
            !tail.is_empty() && haystack.contains_folded(tail)
        }
        None => false,
    }
}

/// Returns the leading characters of a raw quote, for display.
fn quote_prefix(quote: &str, max_chars: usize) -> String {
    let trimmed = quote.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => trimmed[..idx].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

/// Renders the blocking errors of a result as corrective directives.
///
/// Only the errors of the given result are rendered, so the list shrinks as
/// attempts fix items. Duplicates are dropped and order is preserved.
#[must_use]
pub fn fix_instructions(result: &ValidationResult) -> Vec<String> {
    let mut directives: Vec<String> = Vec::with_capacity(result.errors.len());
    for issue in &result.errors {
        let expected = issue.expected.as_deref().unwrap_or_default();
        let directive = match issue.code {
            IssueCode::FrameworkItemMissingInHtml | IssueCode::FrameworkItemMissingInDesign => format!(
                "Include the exact text \"{expected}\" as a visible label for its framework step."
            ),
            IssueCode::CriticalTerminologyMissing => format!(
                "Include the exact term \"{expected}\" verbatim; do not paraphrase it."
            ),
            IssueCode::ExpertQuoteMissingInHtml => format!(
                "Include the expert quote verbatim, starting with the exact text \"{expected}\"."
            ),
            _ => format!("Resolve {}: {}", issue.code, issue.message),
        };
        if !directives.contains(&directive) {
            directives.push(directive);
        }
    }
    directives
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::contract::{FrameworkItem, TermUsage};
    use pretty_assertions::assert_eq;

    const QUOTE: &str = "Most launches fail not because of the product but because nobody asked whether the market wanted it.";

    fn contract() -> BuilderContext {
        BuilderContext::new("Launch gate review")
            .with_item(FrameworkItem::new(1, "Gate 1: Market Fit", "Evidence of customer pull"))
            .with_item(FrameworkItem::new(2, "Unit Economics", "Contribution margin per order"))
            .with_item(FrameworkItem::new(3, "Team Readiness", "Owners for every workstream"))
            .with_term(TermUsage::new("customer pull", "demand signal"))
            .with_term(TermUsage::new("burn multiple", "investor shorthand"))
            .with_quote(QUOTE, "A. Founder")
    }

    #[test]
    fn test_every_missing_item_is_one_error() {
        let ctx = BuilderContext::new("gates")
            .with_item(FrameworkItem::new(1, "Alpha", "first"))
            .with_item(FrameworkItem::new(2, "Beta", "second"))
            .with_item(FrameworkItem::new(3, "Gamma", "third"));

        let result = OutputValidator::new().validate("<html><body>nothing here</body></html>", &ctx);

        assert!(!result.passed);
        assert_eq!(result.error_count(IssueCode::FrameworkItemMissingInHtml), 3);
        assert_eq!(result.errors.len(), 3);
    }

    #[test]
    fn test_critical_vs_advisory_terminology() {
        let ctx = BuilderContext::new("gates")
            .with_item(FrameworkItem::new(1, "Market Fit", "Evidence of customer pull"))
            .with_term(TermUsage::new("customer pull", "demand signal"))
            .with_term(TermUsage::new("burn multiple", "investor shorthand"));

        let result = OutputValidator::new().validate("<h2>Market Fit</h2><p>Demand looks fine.</p>", &ctx);

        assert!(!result.passed);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.error_count(IssueCode::CriticalTerminologyMissing), 1);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warning_count(IssueCode::TerminologyGenericized), 1);
    }

    #[test]
    fn test_warnings_alone_do_not_block() {
        let ctx = BuilderContext::new("gates")
            .with_item(FrameworkItem::new(1, "Market Fit", "Demand evidence"))
            .with_term(TermUsage::new("burn multiple", "investor shorthand"));

        let result = OutputValidator::new().validate("<h2>Market Fit</h2>", &ctx);
        assert!(result.passed);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_complete_artifact_is_clean() {
        let html = format!(
            "<section><h2>Market Fit</h2><p>Look for customer pull.</p>\
             <h2>Unit Economics</h2><h2>Team Readiness</h2>\
             <p>Watch the burn multiple.</p><blockquote>{QUOTE}</blockquote></section>"
        );
        let result = OutputValidator::new().validate(&html, &contract());

        assert!(result.passed);
        assert!(result.is_clean(), "unexpected findings: {result:?}");
    }

    #[test]
    fn test_label_prefix_framing_is_tolerated() {
        let ctx = BuilderContext::new("gates").with_item(FrameworkItem::new(1, "Step 1: Define the Problem", "d"));

        let bare = OutputValidator::new().validate("<h3>Define the problem</h3>", &ctx);
        assert!(bare.passed);

        let full = OutputValidator::new().validate("<h3>STEP 1: define THE problem</h3>", &ctx);
        assert!(full.passed);

        let missing = OutputValidator::new().validate("<h3>Step 1</h3>", &ctx);
        assert!(!missing.passed);
    }

    #[test]
    fn test_quote_needs_only_the_prefix() {
        let ctx = BuilderContext::new("q").with_quote(QUOTE, "A. Founder");
        let first_fifty: String = QUOTE.chars().take(50).collect();

        let result = OutputValidator::new().validate(&format!("<q>{first_fifty}...</q>"), &ctx);
        assert!(result.passed);

        let result = OutputValidator::new().validate("<q>Most launches fail.</q>", &ctx);
        assert_eq!(result.error_count(IssueCode::ExpertQuoteMissingInHtml), 1);
    }

    #[test]
    fn test_short_quote_is_still_checked() {
        let ctx = BuilderContext::new("q").with_quote("Cash is oxygen.", "CFO");

        let missing = OutputValidator::new().validate("<p>Cash matters.</p>", &ctx);
        assert!(!missing.passed);
        assert_eq!(missing.errors[0].expected.as_deref(), Some("Cash is oxygen."));

        let present = OutputValidator::new().validate("<p>\u{201C}Cash is oxygen.\u{201D}</p>", &ctx);
        assert!(present.passed);
    }

    #[test]
    fn test_empty_contract_always_passes() {
        let result = OutputValidator::new().validate("", &BuilderContext::new("empty"));
        assert!(result.passed);
        assert!(result.is_clean());
    }

    #[test]
    fn test_fix_instructions_shrink_as_items_are_fixed() {
        let ctx = contract();
        let validator = OutputValidator::new();

        let first = validator.validate("<p>draft</p>", &ctx);
        let first_fixes = fix_instructions(&first);
        assert_eq!(first_fixes.len(), 5);

        let second = validator.validate("<h2>Market Fit</h2><p>customer pull</p><h2>Unit Economics</h2>", &ctx);
        let second_fixes = fix_instructions(&second);
        assert_eq!(second_fixes.len(), 2);
        assert!(second_fixes.iter().any(|f| f.contains("Team Readiness")));
        assert!(second_fixes.iter().all(|f| !f.contains("Unit Economics")));
    }

    #[test]
    fn test_fix_instructions_skip_warnings() {
        let ctx = BuilderContext::new("t").with_term(TermUsage::new("burn multiple", "jargon"));
        let result = OutputValidator::new().validate("<p>nothing</p>", &ctx);
        assert!(fix_instructions(&result).is_empty());
    }

    #[test]
    fn test_label_carried_by_input_attributes() {
        let ctx = BuilderContext::new("gates").with_item(
            FrameworkItem::new(1, "Market Fit", "Demand evidence").with_input_kind("number"),
        );

        let html = r#"<input type="number" placeholder="Market Fit" aria-label="Market Fit">"#;
        let result = OutputValidator::new().validate(html, &ctx);
        assert!(result.passed, "{:?}", result.errors);
    }

    #[test]
    fn test_label_split_by_inline_markup() {
        let ctx = BuilderContext::new("gates").with_item(FrameworkItem::new(1, "Market Fit", "d"));

        let result = OutputValidator::new()
            .validate("<h2><span class=\"initial\">M</span>arket Fit</h2>", &ctx);
        assert!(result.passed, "{:?}", result.errors);
    }

    #[test]
    fn test_terms_match_inside_attributes() {
        let ctx = BuilderContext::new("gates")
            .with_item(FrameworkItem::new(1, "Market Fit", "Evidence of customer pull"))
            .with_term(TermUsage::new("customer pull", "demand signal"));

        let result = OutputValidator::new()
            .validate("<h2>Market Fit</h2><input title=\"Customer Pull score\">", &ctx);
        assert!(result.passed, "{:?}", result.errors);
    }

    #[test]
    fn test_quote_prefix_is_case_sensitive() {
        let ctx = BuilderContext::new("q").with_quote("Cash is oxygen.", "CFO");

        let shouted = OutputValidator::new().validate("<p>CASH IS OXYGEN.</p>", &ctx);
        assert_eq!(shouted.error_count(IssueCode::ExpertQuoteMissingInHtml), 1);

        let styled = OutputValidator::new().validate("<p><em>Cash</em> is\n  oxygen.</p>", &ctx);
        assert!(styled.passed, "{:?}", styled.errors);
    }
}
