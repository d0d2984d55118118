use serde::Deserialize;
use thiserror::Error;

use super::concept::Concept;
use super::phase::Phase;
use super::record::ContentRecord;
use crate::types::identifiers::RecordId;

/// An unparsed description as handed over by a `CatalogSource`.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub id: RecordId,
    pub bytes: Vec<u8>,
}

impl RawRecord {
    pub fn new(id: RecordId, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RecordParseError {
    #[error("Description {id} is not valid UTF-8")]
    InvalidUtf8 { id: RecordId },
    #[error("Description {id} failed to decode: {source}")]
    Decode {
        id: RecordId,
        #[source]
        source: serde_json::Error,
    },
}

pub trait RecordParser {
    fn parse(&self, raw: &RawRecord) -> Result<ContentRecord, RecordParseError>;
}

/// On-disk shape of a JSON description file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DescriptionFile {
    reference: String,
    #[serde(default)]
    concepts: Vec<Concept>,
    #[serde(default)]
    phase: Option<Phase>,
    #[serde(default)]
    remediation_only: bool,
}

/// Decodes JSON description files:
///
/// ```json
/// {
///   "reference": "rules/forces.html",
///   "phase": "Rule",
///   "remediation_only": false,
///   "concepts": [
///     { "name": "Forces", "activity": { "type": "passive", "attributes": ["Easy"] } }
///   ]
/// }
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRecordParser;

impl RecordParser for JsonRecordParser {
    fn parse(&self, raw: &RawRecord) -> Result<ContentRecord, RecordParseError> {
        let text = std::str::from_utf8(&raw.bytes).map_err(|_| RecordParseError::InvalidUtf8 {
            id: raw.id.clone(),
        })?;

        let file: DescriptionFile =
            serde_json::from_str(text).map_err(|source| RecordParseError::Decode {
                id: raw.id.clone(),
                source,
            })?;

        Ok(ContentRecord::new(
            raw.id.clone(),
            file.reference,
            file.concepts,
            file.phase,
            file.remediation_only,
        ))
    }
}
