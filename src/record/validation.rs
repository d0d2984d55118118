use std::collections::BTreeSet;

use thiserror::Error;

use super::record::ContentRecord;

/// Semantic problems found in an otherwise well-formed description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Record {0} has an empty content reference")]
    EmptyReference(String),
    #[error("Record {0} declares a concept with an empty name")]
    EmptyConceptName(String),
    #[error("Record {record} declares concept '{concept}' more than once")]
    DuplicateConcept { record: String, concept: String },
    #[error("Record {record} has a blank attribute value on concept '{concept}'")]
    BlankAttribute { record: String, concept: String },
    #[error("Record {record} failed validation: {reason}")]
    Rejected { record: String, reason: String },
}

pub trait RecordValidator {
    fn validate(&self, record: &ContentRecord) -> Result<(), ValidationError>;
}

/// Checks the invariants every description must hold regardless of course.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralValidator;

impl RecordValidator for StructuralValidator {
    fn validate(&self, record: &ContentRecord) -> Result<(), ValidationError> {
        let id = record.id.as_str();

        if record.reference.trim().is_empty() {
            return Err(ValidationError::EmptyReference(id.to_string()));
        }

        let mut seen = BTreeSet::new();
        for concept in &record.concepts {
            if concept.name.trim().is_empty() {
                return Err(ValidationError::EmptyConceptName(id.to_string()));
            }

            if !seen.insert(concept.name.to_lowercase()) {
                return Err(ValidationError::DuplicateConcept {
                    record: id.to_string(),
                    concept: concept.name.clone(),
                });
            }

            if let Some(attributes) = concept.activity.attributes() {
                if attributes.iter().any(|a| a.trim().is_empty()) {
                    return Err(ValidationError::BlankAttribute {
                        record: id.to_string(),
                        concept: concept.name.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl<F> RecordValidator for F
where
    F: Fn(&ContentRecord) -> Result<(), ValidationError>,
{
    fn validate(&self, record: &ContentRecord) -> Result<(), ValidationError> {
        self(record)
    }
}
