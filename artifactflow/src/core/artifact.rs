//! The generated artifact.

use serde::{Deserialize, Serialize};

/// An artifact produced by the building or revision stage.
///
/// The content is the full generated document (usually HTML). The
/// fingerprint is derived from the content and changes whenever the content
/// does, which lets the orchestrator notice regeneration attempts that
/// produced the same output twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// A unique identifier for the artifact.
    pub id: String,

    /// The generated document.
    pub content: String,

    /// SHA-256 of the content, hex encoded.
    pub fingerprint: String,

    /// When the artifact was created (ISO 8601).
    pub created_at: String,
}

impl Artifact {
    /// Creates a new artifact with a generated id.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_id(crate::utils::generate_id(), content)
    }

    /// Creates a new artifact with a specific id.
    #[must_use]
    pub fn with_id(id: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: id.into(),
            fingerprint: crate::utils::fingerprint(&content),
            content,
            created_at: crate::utils::iso_timestamp(),
        }
    }

    /// Returns the content length in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Returns true if both artifacts carry identical content.
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint
    }
}
