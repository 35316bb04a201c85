//! Artifacts recovered from a generated response.

use serde::{Deserialize, Serialize};

/// A named code block found in a model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedArtifact {
    /// The filename as written in the response (relative, `/`-separated).
    pub filename: String,

    /// Block body with leading/trailing whitespace trimmed.
    pub content: String,
}

impl ExtractedArtifact {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}
