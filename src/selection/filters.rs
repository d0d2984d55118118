use crate::record::{names_match, ContentRecord, Phase};
use crate::types::selection_bundle::SearchRequest;

/// Reason a record fails phase admission, `None` if it is admitted.
pub fn phase_rejection(record: &ContentRecord, request: &SearchRequest) -> Option<&'static str> {
    if request.remediation_only {
        if record.phase == Some(Phase::Practice) {
            return Some("practice content is never used for remediation");
        }

        match request.phase {
            // remediation content for a specific phase, e.g. Rule only
            Some(target) if !target.is_remediation() => match record.phase {
                None => Some("not tagged with the requested phase"),
                Some(phase) if phase != target => Some("tagged with a different phase"),
                Some(_) => None,
            },
            _ if request.exclude_other_phases_during_remediation && record.phase.is_some() => {
                Some("phase-tagged content excluded during remediation")
            }
            _ => None,
        }
    } else {
        match record.phase {
            Some(phase) if request.phase != Some(phase) => Some("tagged with a different phase"),
            Some(_) => None,
            None if request.phase.is_some_and(|p| !p.is_remediation()) => {
                Some("remediation content cannot fill an ordinary phase")
            }
            None => None,
        }
    }
}

pub fn admit(record: &ContentRecord, request: &SearchRequest) -> bool {
    phase_rejection(record, request).is_none()
}

/// Priority tiers for one required concept name.
///
/// Each tier holds the indices of the records whose declared concept has the
/// activity type of one required entry for that name; earlier entries in the
/// request give earlier tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptTiers {
    pub concept: String,
    pub tiers: Vec<Vec<usize>>,
}

/// Group records (by index) into per-concept activity priority tiers.
///
/// A concept gets an entry only once some record matches one of its
/// activities, so the first tier of every entry is non-empty. Later
/// occurrences of an already-seen name always open a new tier, even if
/// it stays empty.
pub fn group_by_activity(records: &[&ContentRecord], request: &SearchRequest) -> Vec<ConceptTiers> {
    let mut grouped: Vec<ConceptTiers> = Vec::new();

    for wanted in &request.required_concepts {
        let matching: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                record
                    .concept(&wanted.name)
                    .is_some_and(|c| c.activity.same_kind(&wanted.activity))
            })
            .map(|(idx, _)| idx)
            .collect();

        match grouped.iter_mut().find(|g| names_match(&g.concept, &wanted.name)) {
            Some(entry) => entry.tiers.push(matching),
            None if !matching.is_empty() => grouped.push(ConceptTiers {
                concept: wanted.name.clone(),
                tiers: vec![matching],
            }),
            None => {}
        }
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Concept, RecordId};

    fn record(id: &str, phase: Option<Phase>, remediation_only: bool) -> ContentRecord {
        ContentRecord::new(
            RecordId::new(id),
            format!("{id}.html"),
            vec![Concept::active("A")],
            phase,
            remediation_only,
        )
    }

    #[test]
    fn ordinary_search_requires_exact_phase() {
        let request = SearchRequest::for_phase(Phase::Rule);

        assert!(admit(&record("rule", Some(Phase::Rule), false), &request));
        assert!(!admit(&record("example", Some(Phase::Example), false), &request));
        assert!(!admit(&record("untagged", None, false), &request));
    }

    #[test]
    fn remediation_phase_search_takes_untagged_content() {
        let request = SearchRequest::for_phase(Phase::RemediationAfterRecall);

        assert!(admit(&record("untagged", None, false), &request));
        assert!(admit(&record("remedial", None, true), &request));
        assert!(!admit(&record("rule", Some(Phase::Rule), false), &request));
    }

    #[test]
    fn remediation_only_flag_is_kept_out_of_ordinary_phases() {
        let request = SearchRequest::for_phase(Phase::Rule);
        assert!(!admit(&record("remedial", None, true), &request));
    }

    #[test]
    fn remediation_search_excludes_practice() {
        let request = SearchRequest::remediation(None);

        assert!(!admit(&record("practice", Some(Phase::Practice), false), &request));
        assert!(admit(&record("rule", Some(Phase::Rule), false), &request));
        assert!(admit(&record("untagged", None, true), &request));
    }

    #[test]
    fn remediation_for_specific_phase() {
        let request = SearchRequest::remediation(Some(Phase::Example));

        assert!(admit(&record("example", Some(Phase::Example), false), &request));
        assert!(!admit(&record("rule", Some(Phase::Rule), false), &request));
        assert!(!admit(&record("untagged", None, true), &request));
    }

    #[test]
    fn remediation_can_exclude_phase_tagged_content() {
        let request = SearchRequest::remediation(Some(Phase::RemediationAfterPractice))
            .exclude_other_phases();

        assert!(!admit(&record("rule", Some(Phase::Rule), false), &request));
        assert!(admit(&record("untagged", None, true), &request));
    }

    #[test]
    fn grouping_opens_a_tier_per_repeated_concept() {
        let active = ContentRecord::new(
            RecordId::new("active"),
            "active.html",
            vec![Concept::active("A")],
            Some(Phase::Rule),
            false,
        );
        let passive = ContentRecord::new(
            RecordId::new("passive"),
            "passive.html",
            vec![Concept::passive("a", ["Easy"])],
            Some(Phase::Rule),
            false,
        );
        let request = SearchRequest::for_phase(Phase::Rule)
            .require(Concept::active("A"))
            .require(Concept::passive("A", Vec::<String>::new()));

        let grouped = group_by_activity(&[&active, &passive], &request);
        assert_eq!(
            grouped,
            vec![ConceptTiers {
                concept: "A".into(),
                tiers: vec![vec![0], vec![1]],
            }]
        );
    }

    #[test]
    fn grouping_skips_concepts_without_matching_activity() {
        let active = ContentRecord::new(
            RecordId::new("active"),
            "active.html",
            vec![Concept::active("A")],
            Some(Phase::Rule),
            false,
        );
        let request = SearchRequest::for_phase(Phase::Rule)
            .require(Concept::new("A", crate::record::ActivityType::Interactive));

        assert!(group_by_activity(&[&active], &request).is_empty());
    }
}
