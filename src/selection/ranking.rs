use crate::record::{Concept, ContentRecord};

pub trait AttributeScorer {
    /// Number of preferred attribute values the record offers for the
    /// required concepts.
    fn score(&self, record: &ContentRecord, required: &[Concept]) -> usize;
}

/// v0: count exact attribute value matches on passive concepts.
///
/// Only passive content carries attributes, so anything else scores 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct PreferredAttributeScorer;

impl AttributeScorer for PreferredAttributeScorer {
    fn score(&self, record: &ContentRecord, required: &[Concept]) -> usize {
        let mut matches = 0;

        for wanted in required {
            let Some(preferred) = wanted.activity.attributes() else {
                continue;
            };

            for declared in record.concepts.iter().filter(|c| c.is_named(&wanted.name)) {
                if let Some(offered) = declared.activity.attributes() {
                    matches += preferred.iter().filter(|p| offered.contains(*p)).count();
                }
            }
        }

        matches
    }
}
