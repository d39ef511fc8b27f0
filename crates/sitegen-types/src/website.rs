//! Generated website artifact

use crate::plan::GenerationPlan;
use serde::{Deserialize, Serialize};

/// A generated website: full markup document, the plan it was built from,
/// and the backend identifier used for routing and lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsiteArtifact {
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub plan: Option<GenerationPlan>,
}

impl WebsiteArtifact {
    pub fn new(id: impl Into<String>, code: impl Into<String>, plan: Option<GenerationPlan>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            plan,
        }
    }

    /// Replace the markup wholesale (edits never patch in place)
    pub fn replace_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    /// Size of the markup in bytes
    pub fn code_len(&self) -> usize {
        self.code.len()
    }

    /// Number of lines in the markup
    pub fn line_count(&self) -> usize {
        self.code.lines().count()
    }
}
