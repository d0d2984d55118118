use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::record::{names_match, Concept, ContentRecord, Phase};
use crate::types::identifiers::RecordId;

/// What one phase of a lesson needs from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    /// Concepts to teach, in priority order. A name may repeat with a
    /// different activity to express a fallback (e.g. Active, then Passive).
    pub required_concepts: Vec<Concept>,
    /// Concepts content may mention in addition to the required ones.
    pub optional_concepts: BTreeSet<String>,
    pub phase: Option<Phase>,
    pub remediation_only: bool,
    pub exclude_other_phases_during_remediation: bool,
    /// Whether a description covering only some required concepts is
    /// acceptable on its own.
    pub any_subset_allowed: bool,
    /// Content references already shown in this session.
    pub already_delivered: BTreeSet<String>,
    pub files_to_skip: BTreeSet<RecordId>,
    /// When false every matching description is returned unranked.
    pub apply_selection_logic: bool,
    pub validate_records: bool,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            required_concepts: Vec::new(),
            optional_concepts: BTreeSet::new(),
            phase: None,
            remediation_only: false,
            exclude_other_phases_during_remediation: false,
            any_subset_allowed: false,
            already_delivered: BTreeSet::new(),
            files_to_skip: BTreeSet::new(),
            apply_selection_logic: true,
            validate_records: true,
        }
    }
}

impl SearchRequest {
    pub fn for_phase(phase: Phase) -> Self {
        Self {
            phase: Some(phase),
            ..Self::default()
        }
    }

    /// A remediation-only search, optionally narrowed to one phase.
    pub fn remediation(phase: Option<Phase>) -> Self {
        Self {
            phase,
            remediation_only: true,
            ..Self::default()
        }
    }

    pub fn require(mut self, concept: Concept) -> Self {
        self.required_concepts.push(concept);
        self
    }

    pub fn allow(mut self, name: impl Into<String>) -> Self {
        self.optional_concepts.insert(name.into());
        self
    }

    pub fn any_subset(mut self, allowed: bool) -> Self {
        self.any_subset_allowed = allowed;
        self
    }

    pub fn delivered(mut self, reference: impl Into<String>) -> Self {
        self.already_delivered.insert(reference.into());
        self
    }

    pub fn skip(mut self, id: RecordId) -> Self {
        self.files_to_skip.insert(id);
        self
    }

    pub fn exclude_other_phases(mut self) -> Self {
        self.exclude_other_phases_during_remediation = true;
        self
    }

    /// List every matching description instead of choosing among them.
    pub fn listing(mut self) -> Self {
        self.apply_selection_logic = false;
        self
    }

    pub fn without_validation(mut self) -> Self {
        self.validate_records = false;
        self
    }

    /// Required concept names with repeats removed, first spelling kept.
    pub fn distinct_required_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.required_concepts.len());
        for concept in &self.required_concepts {
            if !names.iter().any(|n| names_match(n, &concept.name)) {
                names.push(&concept.name);
            }
        }
        names
    }

    pub fn is_optional(&self, name: &str) -> bool {
        self.optional_concepts.iter().any(|o| names_match(o, name))
    }

    /// Searching for the remediation phase itself rather than for a
    /// Rule/Example/Recall/Practice phase.
    pub fn is_remediation_search(&self) -> bool {
        self.phase.map_or(true, Phase::is_remediation)
    }

    pub fn check(&self, key: Phase) -> Result<(), SelectionError> {
        if self.phase.is_none() && !self.remediation_only {
            return Err(SelectionError::RequestConfiguration {
                phase: key,
                reason: "request names neither a phase nor remediation-only content".into(),
            });
        }

        if self
            .required_concepts
            .iter()
            .any(|c| c.name.trim().is_empty())
        {
            return Err(SelectionError::RequestConfiguration {
                phase: key,
                reason: "required concept with an empty name".into(),
            });
        }

        Ok(())
    }
}

/// A description chosen for a phase, with the evidence behind the choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedRecord {
    pub record: ContentRecord,
    pub why: SelectionWhy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionWhy {
    pub covered_concepts: Vec<String>,
    pub covers_all_concepts: bool,
    pub attribute_matches: usize,
    pub already_delivered: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMetadata {
    pub records_considered: usize,
    pub records_admitted: usize,
    pub records_skipped: usize,
    pub records_selected: usize,
    /// Descriptions that failed evaluation during this call.
    pub newly_skipped: Vec<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSelection {
    pub records: Vec<SelectedRecord>,
    pub failure: Option<PhaseFailure>,
    pub metadata: PhaseMetadata,
}

impl PhaseSelection {
    pub fn references(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .map(|s| s.record.reference.as_str())
            .collect()
    }

    pub fn ids(&self) -> BTreeSet<&RecordId> {
        self.records.iter().map(|s| &s.record.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Result of one `select` call: a selection per requested phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionOutcome {
    pub phases: BTreeMap<Phase, PhaseSelection>,
}

impl SelectionOutcome {
    pub fn phase(&self, phase: Phase) -> Option<&PhaseSelection> {
        self.phases.get(&phase)
    }

    pub fn records(&self, phase: Phase) -> impl Iterator<Item = &ContentRecord> {
        self.phases
            .get(&phase)
            .into_iter()
            .flat_map(|s| s.records.iter().map(|r| &r.record))
    }
}

/// Why a phase produced no selection even though its request was valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhaseFailure {
    #[error("{candidates} candidates exceed the enumeration limit of {limit}")]
    EnumerationOverflow { candidates: usize, limit: usize },

    #[error("{combinations} activity tier combinations exceed the limit of {limit}")]
    TierOverflow { combinations: usize, limit: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("Invalid search request for {phase}: {reason}")]
    RequestConfiguration { phase: Phase, reason: String },
}
