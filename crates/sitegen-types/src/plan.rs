//! Design plan produced by the prompt analysis step
//!
//! The plan is immutable once received: it is rendered as a summary and
//! sent back verbatim with edit requests. The JSON document the backend sent
//! is kept as-is (unknown keys, `null`s and key order included); the typed
//! accessors are read-only views that fall back to empty values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Design blueprint for a website
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationPlan(Value);

impl Default for GenerationPlan {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl From<Value> for GenerationPlan {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl GenerationPlan {
    /// The plan exactly as received
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn website_type(&self) -> &str {
        text(self.0.get("websiteType"))
    }

    pub fn design_style(&self) -> &str {
        text(self.0.get("designStyle"))
    }

    pub fn target_audience(&self) -> &str {
        text(self.0.get("targetAudience"))
    }

    pub fn heading_font(&self) -> &str {
        text(self.0.get("typography").and_then(|t| t.get("headingFont")))
    }

    pub fn body_font(&self) -> &str {
        text(self.0.get("typography").and_then(|t| t.get("bodyFont")))
    }

    /// `(name, code)` pairs in the order the backend sent them
    pub fn colors(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0
            .get("colorPalette")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|palette| palette.iter())
            .filter_map(|(name, code)| code.as_str().map(|code| (name.as_str(), code)))
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> + '_ {
        self.0
            .get("sections")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    pub fn section_count(&self) -> usize {
        self.sections().count()
    }
}

fn text(value: Option<&Value>) -> &str {
    value.and_then(Value::as_str).unwrap_or("")
}
