//! Structural checks on the contract itself and on the designed specification.
//!
//! Findings here are observational. The orchestrator logs them but never
//! gates on them.

use super::contract::BuilderContext;
use super::normalize::normalize_text;
use super::result::{IssueCode, ValidationIssue, ValidationResult, ValidationStage};
use crate::core::Specification;

/// Checks a freshly extracted contract for structural defects.
#[must_use]
pub fn validate_extraction(contract: &BuilderContext) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (position, item) in contract.framework_items.iter().enumerate() {
        if item.label.trim().is_empty() {
            errors.push(ValidationIssue::new(
                IssueCode::FrameworkItemLabelEmpty,
                format!("frameworkItems[{position}].label"),
                format!("Framework item {} has an empty label", item.index),
            ));
        }

        let expected = u32::try_from(position + 1).unwrap_or(u32::MAX);
        if item.index != expected {
            warnings.push(
                ValidationIssue::new(
                    IssueCode::FrameworkItemIndexGap,
                    format!("frameworkItems[{position}].index"),
                    "Framework item indices are not sequential from 1",
                )
                .with_expected(expected.to_string())
                .with_actual(item.index.to_string()),
            );
        }
    }

    for (position, usage) in contract.terminology.iter().enumerate() {
        if usage.term.trim().is_empty() {
            warnings.push(ValidationIssue::new(
                IssueCode::TerminologyTermEmpty,
                format!("terminology[{position}].term"),
                "Terminology entry has an empty term",
            ));
        }
    }

    if let Some(quote) = &contract.expert_quote {
        if quote.quote.trim().is_empty() {
            warnings.push(ValidationIssue::new(
                IssueCode::ExpertQuoteEmpty,
                "expertQuote.quote",
                format!("Expert quote from {} has no text", quote.source),
            ));
        }
    }

    ValidationResult::from_issues(ValidationStage::Extraction, errors, warnings)
}

/// Checks that a designed specification reflects the contract.
#[must_use]
pub fn validate_design(spec: &Specification, contract: &BuilderContext) -> ValidationResult {
    let designed = normalize_text(&spec.searchable_text());
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (position, item) in contract.framework_items.iter().enumerate() {
        let label = normalize_text(&item.label);
        if label.is_empty() {
            continue;
        }
        let tail = label.rsplit_once(':').map_or("", |(_, t)| t.trim());
        let found = designed.contains(&label) || (!tail.is_empty() && designed.contains(tail));
        if !found {
            errors.push(
                ValidationIssue::new(
                    IssueCode::FrameworkItemMissingInDesign,
                    format!("frameworkItems[{position}].label"),
                    format!("Framework item \"{}\" is not reflected in the design", item.label),
                )
                .with_expected(item.label.trim()),
            );
        }
    }

    if let Some(calculation) = &contract.calculation {
        let formula = normalize_text(&calculation.formula);
        if !formula.is_empty() && !designed.contains(&formula) {
            warnings.push(
                ValidationIssue::new(
                    IssueCode::CalculationMissingInDesign,
                    "calculation.formula",
                    "The design does not mention the calculation formula",
                )
                .with_expected(calculation.formula.trim()),
            );
        }
    }

    ValidationResult::from_issues(ValidationStage::Design, errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::contract::{Calculation, FrameworkItem, TermUsage};

    #[test]
    fn test_extraction_flags_empty_label_as_blocking() {
        let ctx = BuilderContext::new("gates")
            .with_item(FrameworkItem::new(1, "Scope", "what is in"))
            .with_item(FrameworkItem::new(2, "  ", "blank"));

        let result = validate_extraction(&ctx);
        assert!(!result.passed);
        assert_eq!(result.error_count(IssueCode::FrameworkItemLabelEmpty), 1);
        assert_eq!(result.errors[0].field, "frameworkItems[1].label");
    }

    #[test]
    fn test_extraction_warns_on_index_gap_and_empty_fields() {
        let ctx = BuilderContext::new("gates")
            .with_item(FrameworkItem::new(1, "Scope", "a"))
            .with_item(FrameworkItem::new(3, "Budget", "b"))
            .with_term(TermUsage::new("", "hint"))
            .with_quote(" ", "Anonymous");

        let result = validate_extraction(&ctx);
        assert!(result.passed);
        assert_eq!(result.warning_count(IssueCode::FrameworkItemIndexGap), 1);
        assert_eq!(result.warning_count(IssueCode::TerminologyTermEmpty), 1);
        assert_eq!(result.warning_count(IssueCode::ExpertQuoteEmpty), 1);
        assert_eq!(result.warnings[0].actual.as_deref(), Some("3"));
    }

    #[test]
    fn test_extraction_of_empty_contract_is_clean() {
        assert!(validate_extraction(&BuilderContext::default()).is_clean());
    }

    #[test]
    fn test_design_must_reflect_items() {
        let ctx = BuilderContext::new("gates")
            .with_item(FrameworkItem::new(1, "Gate 1: Market Fit", "a"))
            .with_item(FrameworkItem::new(2, "Unit Economics", "b"));
        let spec = Specification::new("Launch review", "Scores market fit for a launch");

        let result = validate_design(&spec, &ctx);
        assert!(!result.passed);
        assert_eq!(result.error_count(IssueCode::FrameworkItemMissingInDesign), 1);
        assert_eq!(result.errors[0].expected.as_deref(), Some("Unit Economics"));
    }

    #[test]
    fn test_design_warns_on_missing_formula() {
        let ctx = BuilderContext::new("ratio").with_calculation(Calculation {
            formula: "revenue / cost".to_string(),
            go_criterion: "> 1.5".to_string(),
            no_go_criterion: "<= 1.5".to_string(),
        });
        let spec = Specification::new("Ratio", "Compare revenue to cost");
        let result = validate_design(&spec, &ctx);
        assert!(result.passed);
        assert_eq!(result.warning_count(IssueCode::CalculationMissingInDesign), 1);

        let spec = spec.with_requirement("Compute Revenue / Cost and compare to 1.5");
        assert!(validate_design(&spec, &ctx).is_clean());
    }
}
