use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::concept::{ActivityType, Concept};
use super::phase::Phase;
use crate::types::identifiers::{RecordId, RecordVersion};

/// A parsed content description.
///
/// Immutable once built; the catalog owns it for the duration of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: RecordId,
    pub version: RecordVersion,
    /// File path or URL of the content asset being described.
    pub reference: String,
    pub concepts: Vec<Concept>,
    pub phase: Option<Phase>,
    pub remediation_only: bool,
}

impl ContentRecord {
    /// Build a record, computing its version from the descriptive fields.
    ///
    /// No semantic checks happen here; see `RecordValidator`.
    pub fn new(
        id: RecordId,
        reference: impl Into<String>,
        concepts: Vec<Concept>,
        phase: Option<Phase>,
        remediation_only: bool,
    ) -> Self {
        let reference = reference.into();
        let version = fingerprint(&reference, &concepts, phase, remediation_only);

        ContentRecord {
            id,
            version,
            reference,
            concepts,
            phase,
            remediation_only,
        }
    }

    pub fn concept(&self, name: &str) -> Option<&Concept> {
        self.concepts.iter().find(|c| c.is_named(name))
    }

    /// True when every declared concept is passive. A record with no concepts
    /// is not passive content.
    pub fn is_passive_content(&self) -> bool {
        !self.concepts.is_empty() && self.concepts.iter().all(|c| c.activity.is_passive())
    }
}

// Field order and separators are part of the version format.
fn fingerprint(
    reference: &str,
    concepts: &[Concept],
    phase: Option<Phase>,
    remediation_only: bool,
) -> RecordVersion {
    let mut hasher = Sha256::new();
    hasher.update(reference.as_bytes());
    hasher.update([0u8]);

    for concept in concepts {
        hasher.update(concept.name.as_bytes());
        hasher.update([0u8]);
        match &concept.activity {
            ActivityType::Passive { attributes } => {
                hasher.update(b"passive");
                for attribute in attributes {
                    hasher.update([0u8]);
                    hasher.update(attribute.as_bytes());
                }
            }
            ActivityType::Active => hasher.update(b"active"),
            ActivityType::Constructive => hasher.update(b"constructive"),
            ActivityType::Interactive => hasher.update(b"interactive"),
        }
        hasher.update([1u8]);
    }

    hasher.update(phase.map(Phase::name).unwrap_or("").as_bytes());
    hasher.update([u8::from(remediation_only)]);

    RecordVersion::from_hasher(hasher)
}
