//! Text normalization for content matching.
//!
//! Artifacts are usually HTML, so labels can be split by markup, written
//! with entities or carried only in attributes such as `placeholder`. The
//! artifact is searched twice: once as visible text with markup removed and
//! once as raw markup, both collapsed the same way as the expected text.

use regex::{Captures, Regex};
use std::sync::OnceLock;

fn markup_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)<!--.*?-->|</?([A-Za-z][A-Za-z0-9]*)[^<>]*>")
            .expect("markup pattern is valid")
    })
}

fn whitespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// Phrasing elements that can sit inside a word without separating it.
const INLINE_TAGS: [&str; 16] = [
    "a", "abbr", "b", "bdi", "cite", "code", "em", "font", "i", "mark", "s", "small", "span",
    "strong", "sub", "sup",
];

const ENTITIES: [(&str, &str); 10] = [
    ("&nbsp;", " "),
    ("&quot;", "\""),
    ("&#34;", "\""),
    ("&#39;", "'"),
    ("&#x27;", "'"),
    ("&apos;", "'"),
    ("&rsquo;", "'"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    // last, so "&amp;lt;" decodes to "&lt;" and not "<"
    ("&amp;", "&"),
];

/// Removes markup tags and comments.
///
/// Inline tags and comments vanish; every other tag becomes a space.
fn strip_markup(text: &str) -> String {
    markup_pattern()
        .replace_all(text, |caps: &Captures<'_>| match caps.get(1) {
            None => "",
            Some(name) if INLINE_TAGS.contains(&name.as_str().to_ascii_lowercase().as_str()) => "",
            Some(_) => " ",
        })
        .into_owned()
}

/// Decodes common entities, folds curly quotes to straight ones and
/// collapses whitespace. Case and markup are kept.
#[must_use]
pub fn collapse_text(text: &str) -> String {
    let mut decoded = text.to_string();
    for (entity, replacement) in ENTITIES {
        if decoded.contains(entity) {
            decoded = decoded.replace(entity, replacement);
        }
    }
    let folded: String = decoded
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{00A0}' => ' ',
            other => other,
        })
        .collect();
    whitespace_pattern()
        .replace_all(folded.trim(), " ")
        .into_owned()
}

/// Returns the visible text of markup, collapsed but with case kept.
#[must_use]
pub fn visible_text(text: &str) -> String {
    collapse_text(&strip_markup(text))
}

/// Normalizes text for case-insensitive containment checks.
///
/// Removes markup tags and comments, decodes common entities, folds curly
/// quotes to straight ones, collapses whitespace and lower-cases.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    visible_text(text).to_lowercase()
}

/// Returns the first `max_chars` characters of already-normalized text.
#[must_use]
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].trim_end(),
        None => text,
    }
}

/// An artifact prepared for containment checks.
///
/// Holds the visible text and the raw markup, each collapsed, in original
/// and lower case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Haystack {
    visible: String,
    visible_lower: String,
    raw: String,
    raw_lower: String,
}

impl Haystack {
    /// Prepares an artifact.
    #[must_use]
    pub fn new(artifact: &str) -> Self {
        let visible = visible_text(artifact);
        let raw = collapse_text(artifact);
        Self {
            visible_lower: visible.to_lowercase(),
            raw_lower: raw.to_lowercase(),
            visible,
            raw,
        }
    }

    /// Returns true if already-normalized `needle` occurs in either form,
    /// ignoring case.
    #[must_use]
    pub fn contains_folded(&self, needle: &str) -> bool {
        self.visible_lower.contains(needle) || self.raw_lower.contains(needle)
    }

    /// Returns true if `needle` occurs in either form with its case intact.
    #[must_use]
    pub fn contains_exact(&self, needle: &str) -> bool {
        self.visible.contains(needle) || self.raw.contains(needle)
    }
}
