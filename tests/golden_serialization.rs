use std::collections::BTreeMap;

use content_core::record::{ContentRecord, Phase, RecordId};
use content_core::selection::SelectionConfig;
use content_core::types::{
    PhaseFailure, PhaseMetadata, PhaseSelection, SearchRequest, SelectedRecord, SelectionOutcome, SelectionWhy,
};

// Builds the output types by hand so the snapshot only depends on their
// layout, not on selection logic.
fn mock_record() -> ContentRecord {
    serde_json::from_str(
        r#"{
            "id": "unit1/forces.metadata.json",
            "version": "sha256:mock",
            "reference": "rules/forces.html",
            "concepts": [
                { "name": "Forces", "activity": { "type": "passive", "attributes": ["Easy"] } }
            ],
            "phase": "Rule",
            "remediation_only": false
        }"#,
    )
    .unwrap()
}

#[test]
fn golden_selection_outcome_serialization() {
    let rule = PhaseSelection {
        records: vec![SelectedRecord {
            record: mock_record(),
            why: SelectionWhy {
                covered_concepts: vec!["Forces".to_string()],
                covers_all_concepts: true,
                attribute_matches: 1,
                already_delivered: false,
            },
        }],
        failure: None,
        metadata: PhaseMetadata {
            records_considered: 3,
            records_admitted: 2,
            records_skipped: 0,
            records_selected: 1,
            newly_skipped: Vec::new(),
        },
    };

    let practice = PhaseSelection {
        records: Vec::new(),
        failure: Some(PhaseFailure::EnumerationOverflow {
            candidates: 25,
            limit: 20,
        }),
        metadata: PhaseMetadata {
            records_considered: 3,
            records_admitted: 25,
            records_skipped: 1,
            records_selected: 0,
            newly_skipped: vec![RecordId::new("unit2/broken.metadata.json")],
        },
    };

    let outcome = SelectionOutcome {
        phases: BTreeMap::from([(Phase::Practice, practice), (Phase::Rule, rule)]),
    };

    let json_str = serde_json::to_string_pretty(&outcome).unwrap();

    // Phases serialize in instructional order regardless of insertion order.
    const EXPECTED_JSON: &str = r#"{
      "phases": {
        "Rule": {
          "records": [
            {
              "record": {
                "id": "unit1/forces.metadata.json",
                "version": "sha256:mock",
                "reference": "rules/forces.html",
                "concepts": [
                  {
                    "name": "Forces",
                    "activity": { "type": "passive", "attributes": ["Easy"] }
                  }
                ],
                "phase": "Rule",
                "remediation_only": false
              },
              "why": {
                "covered_concepts": ["Forces"],
                "covers_all_concepts": true,
                "attribute_matches": 1,
                "already_delivered": false
              }
            }
          ],
          "failure": null,
          "metadata": {
            "records_considered": 3,
            "records_admitted": 2,
            "records_skipped": 0,
            "records_selected": 1,
            "newly_skipped": []
          }
        },
        "Practice": {
          "records": [],
          "failure": { "kind": "enumeration_overflow", "candidates": 25, "limit": 20 },
          "metadata": {
            "records_considered": 3,
            "records_admitted": 25,
            "records_skipped": 1,
            "records_selected": 0,
            "newly_skipped": ["unit2/broken.metadata.json"]
          }
        }
      }
    }"#;

    let normalized_actual: String = json_str.chars().filter(|c| !c.is_whitespace()).collect();
    let normalized_expected: String = EXPECTED_JSON.chars().filter(|c| !c.is_whitespace()).collect();

    assert_eq!(normalized_actual, normalized_expected, "JSON structure mismatch against golden snapshot");

    let deserialized: SelectionOutcome = serde_json::from_str(&json_str).expect("Deserialization failed");
    assert_eq!(deserialized, outcome);
    assert_eq!(deserialized.records(Phase::Rule).next().unwrap().version.as_str(), "sha256:mock");
}

#[test]
fn search_request_from_partial_json() {
    let request: SearchRequest = serde_json::from_str(
        r#"{
            "phase": "Recall",
            "required_concepts": [
                { "name": "Forces", "activity": { "type": "active" } },
                { "name": "Forces", "activity": { "type": "passive" } }
            ],
            "already_delivered": ["rules/forces.html"]
        }"#,
    )
    .unwrap();

    assert_eq!(request.phase, Some(Phase::Recall));
    assert_eq!(request.distinct_required_names(), vec!["Forces"]);
    assert!(request.apply_selection_logic);
    assert!(request.validate_records);
    assert!(!request.any_subset_allowed);
    assert!(request.files_to_skip.is_empty());
}

#[test]
fn selection_config_defaults() {
    assert_eq!(SelectionConfig::default(), SelectionConfig::v0());

    let partial = SelectionConfig::from_json(r#"{ "max_enumeration_candidates": 12 }"#).unwrap();
    assert_eq!(partial.max_enumeration_candidates, 12);
    assert_eq!(partial.max_tier_combinations, 256);
    assert_eq!(partial.version, "1");

    let json = serde_json::to_string(&SelectionConfig::v0()).unwrap();
    assert_eq!(
        json,
        r#"{"version":"1","max_enumeration_candidates":20,"max_tier_combinations":256}"#
    );
}
