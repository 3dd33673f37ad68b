//! The required-content contract a generated artifact must honor.

use super::normalize::normalize_text;
use serde::{Deserialize, Serialize};

/// One step of an explicit numbered methodology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkItem {
    /// 1-based position in the methodology.
    pub index: u32,
    /// The item's label, which must appear in the artifact.
    pub label: String,
    /// What the item means.
    pub definition: String,
    /// Kind of input control the item maps to.
    pub input_kind: String,
    /// Placeholder for the input control.
    #[serde(default)]
    pub placeholder: String,
}

impl FrameworkItem {
    /// Creates a framework item with a label and definition.
    #[must_use]
    pub fn new(index: u32, label: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            index,
            label: label.into(),
            definition: definition.into(),
            input_kind: "text".to_string(),
            placeholder: String::new(),
        }
    }

    /// Sets the input kind.
    #[must_use]
    pub fn with_input_kind(mut self, kind: impl Into<String>) -> Self {
        self.input_kind = kind.into();
        self
    }
}

/// A domain term and how the source uses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermUsage {
    /// The term.
    pub term: String,
    /// How the term is used in the source material.
    #[serde(default)]
    pub usage_hint: String,
}

impl TermUsage {
    /// Creates a term with a usage hint.
    #[must_use]
    pub fn new(term: impl Into<String>, usage_hint: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            usage_hint: usage_hint.into(),
        }
    }
}

/// A quotation from a subject-matter expert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertQuote {
    /// The quotation.
    pub quote: String,
    /// Who said it.
    pub source: String,
}

/// The calculation the tool performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calculation {
    /// The formula.
    pub formula: String,
    /// When the result means "go".
    pub go_criterion: String,
    /// When the result means "no go".
    pub no_go_criterion: String,
}

/// Required content extracted from structured source material.
///
/// `framework_items` is non-empty only when the source contained an explicit
/// numbered methodology, and then every item is critical content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderContext {
    /// What the tool is called and what it is for.
    pub tool_identity: String,
    /// The methodology's items, in order.
    #[serde(default)]
    pub framework_items: Vec<FrameworkItem>,
    /// Domain vocabulary.
    #[serde(default)]
    pub terminology: Vec<TermUsage>,
    /// Expert quotation to feature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expert_quote: Option<ExpertQuote>,
    /// Calculation to implement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation: Option<Calculation>,
}

impl BuilderContext {
    /// Creates an empty contract for a tool.
    #[must_use]
    pub fn new(tool_identity: impl Into<String>) -> Self {
        Self {
            tool_identity: tool_identity.into(),
            ..Self::default()
        }
    }

    /// Adds a framework item.
    #[must_use]
    pub fn with_item(mut self, item: FrameworkItem) -> Self {
        self.framework_items.push(item);
        self
    }

    /// Adds a term.
    #[must_use]
    pub fn with_term(mut self, term: TermUsage) -> Self {
        self.terminology.push(term);
        self
    }

    /// Sets the expert quote.
    #[must_use]
    pub fn with_quote(mut self, quote: impl Into<String>, source: impl Into<String>) -> Self {
        self.expert_quote = Some(ExpertQuote {
            quote: quote.into(),
            source: source.into(),
        });
        self
    }

    /// Sets the calculation.
    #[must_use]
    pub fn with_calculation(mut self, calculation: Calculation) -> Self {
        self.calculation = Some(calculation);
        self
    }

    /// Returns true if there are neither framework items nor terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.framework_items.is_empty() && self.terminology.is_empty()
    }

    /// Returns true if the term also appears in a framework item's label or
    /// definition.
    #[must_use]
    pub fn is_critical_term(&self, term: &str) -> bool {
        let needle = normalize_text(term);
        if needle.is_empty() {
            return false;
        }
        self.framework_items.iter().any(|item| {
            normalize_text(&item.label).contains(&needle)
                || normalize_text(&item.definition).contains(&needle)
        })
    }
}
