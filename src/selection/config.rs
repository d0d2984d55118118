use serde::{Deserialize, Serialize};

// Key point:
// Serializable
// Comparable
// Explicit defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub version: String,
    /// Largest candidate list the subset search will enumerate. The search
    /// visits up to 2^N subsets, so this stays in the low tens.
    pub max_enumeration_candidates: usize,
    /// Largest number of activity tier combinations tried per request.
    pub max_tier_combinations: usize,
}

impl SelectionConfig {
    pub fn v0() -> Self {
        Self {
            version: "1".into(),
            max_enumeration_candidates: 20,
            max_tier_combinations: 256,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self::v0()
    }
}
