use crate::record::{names_match, ContentRecord};
use crate::types::selection_bundle::SearchRequest;

/// How a description's concepts line up against a request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchOutcome {
    /// Required concept names the record covers, spelled as in the request.
    pub covered_required: Vec<String>,
    /// First record concept that is neither required nor optional.
    pub extraneous: Option<String>,
}

impl MatchOutcome {
    pub fn has_extraneous(&self) -> bool {
        self.extraneous.is_some()
    }

    pub fn covers_all(&self, distinct_required: usize) -> bool {
        distinct_required > 0 && self.covered_required.len() == distinct_required
    }
}

/// Compare a record's concepts with the request's required and optional sets.
///
/// A request naming no concepts at all places no constraint on concepts.
pub fn match_concepts(record: &ContentRecord, request: &SearchRequest) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();

    if request.required_concepts.is_empty() && request.optional_concepts.is_empty() {
        return outcome;
    }

    let required = request.distinct_required_names();

    for concept in &record.concepts {
        match required.iter().find(|name| names_match(name, &concept.name)) {
            Some(&name) => {
                if !outcome.covered_required.iter().any(|c| c.as_str() == name) {
                    outcome.covered_required.push(name.to_string());
                }
            }
            None if request.is_optional(&concept.name) => {}
            None => {
                outcome.extraneous = Some(concept.name.clone());
                break;
            }
        }
    }

    outcome
}
