pub mod candidates;
pub mod combinations;
pub mod concepts;
pub mod config;
pub mod filters;
pub mod ranking;
pub mod tie_break;

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::record::{ContentRecord, Phase, RecordId, RecordValidator, StructuralValidator, ValidationError};
use crate::types::selection_bundle::{
	PhaseMetadata, PhaseSelection, SearchRequest, SelectionError, SelectionOutcome,
};
pub use candidates::{CandidateBuilder, CandidateResult, CandidateSet};
pub use combinations::{Combinations, TierProduct};
pub use concepts::{match_concepts, MatchOutcome};
pub use config::SelectionConfig;
pub use filters::{admit, group_by_activity, ConceptTiers};
pub use ranking::{AttributeScorer, PreferredAttributeScorer};
pub use tie_break::{NoParadata, ParadataRanker, TieBreaker};

/// Why a record was taken out of a phase's search for the rest of the run.
#[derive(Debug, Error)]
pub enum SkipReason {
	#[error(transparent)]
	Invalid(#[from] ValidationError),
}

pub struct ContentSelector<S, P, V> {
	scorer: S,
	paradata: P,
	validator: V,
	config: SelectionConfig,
}

impl Default for ContentSelector<PreferredAttributeScorer, NoParadata, StructuralValidator> {
	fn default() -> Self {
		Self {
			scorer: PreferredAttributeScorer,
			paradata: NoParadata,
			validator: StructuralValidator,
			config: SelectionConfig::v0(),
		}
	}
}

impl<S, P, V> ContentSelector<S, P, V>
where
	S: AttributeScorer,
	P: ParadataRanker,
	V: RecordValidator,
{
	pub fn new(scorer: S, paradata: P, validator: V, config: SelectionConfig) -> Self {
		Self {
			scorer,
			paradata,
			validator,
			config,
		}
	}

	pub fn config(&self) -> &SelectionConfig {
		&self.config
	}

	/// Choose content for every requested phase.
	///
	/// Records that fail evaluation are added to their phase's
	/// `files_to_skip` once all phases are done, so later calls with the same
	/// requests leave them out.
	pub fn select(
		&self,
		catalog: &Catalog,
		requests: &mut BTreeMap<Phase, SearchRequest>,
	) -> Result<SelectionOutcome, SelectionError> {
		let mut rng = StdRng::from_entropy();
		self.select_with_rng(catalog, requests, &mut rng)
	}

	pub fn select_with_rng<R: Rng>(
		&self,
		catalog: &Catalog,
		requests: &mut BTreeMap<Phase, SearchRequest>,
		rng: &mut R,
	) -> Result<SelectionOutcome, SelectionError> {
		// Reject impossible requests before touching the catalog
		for (phase, request) in requests.iter() {
			request.check(*phase)?;
		}

		info!(
			records = catalog.len(),
			phases = requests.len(),
			"selecting content"
		);

		let mut validated = BTreeSet::new();
		let mut outcome = SelectionOutcome::default();

		for (phase, request) in requests.iter() {
			let selection = self.select_phase(*phase, catalog, request, &mut validated, rng);
			outcome.phases.insert(*phase, selection);
		}

		for (phase, selection) in &outcome.phases {
			if let Some(request) = requests.get_mut(phase) {
				request
					.files_to_skip
					.extend(selection.metadata.newly_skipped.iter().cloned());
			}
		}

		Ok(outcome)
	}

	fn select_phase<R: Rng>(
		&self,
		phase: Phase,
		catalog: &Catalog,
		request: &SearchRequest,
		validated: &mut BTreeSet<RecordId>,
		rng: &mut R,
	) -> PhaseSelection {
		let mut metadata = PhaseMetadata {
			records_considered: catalog.len(),
			..PhaseMetadata::default()
		};

		// 1. Filtering and scoring
		let distinct_required = request.distinct_required_names().len();
		let mut results: Vec<CandidateResult> = Vec::new();

		for record in catalog.records() {
			if request.files_to_skip.contains(&record.id) {
				metadata.records_skipped += 1;
				continue;
			}

			match self.evaluate(record, request, distinct_required, validated) {
				Ok(Some(result)) => results.push(result),
				Ok(None) => {}
				Err(reason) => {
					warn!(
						%phase,
						record = %record.id,
						error = %reason,
						"ignoring content description for the rest of this run"
					);
					metadata.records_skipped += 1;
					metadata.newly_skipped.push(record.id.clone());
				}
			}
		}

		metadata.records_admitted = results.len();

		// 2. Candidate sets
		let builder = CandidateBuilder::new(request, &self.config);
		let chosen = match builder.build(&results) {
			Ok(chosen) => chosen,
			Err(failure) => {
				warn!(%phase, error = %failure, "no selection possible");
				return PhaseSelection {
					records: Vec::new(),
					failure: Some(failure),
					metadata,
				};
			}
		};

		let listing = chosen.is_listing();
		let mut chosen: Vec<CandidateResult> = chosen
			.into_indices()
			.into_iter()
			.map(|i| results[i].clone())
			.collect();

		// 3. Tie-breaking, skipped when listing
		if !listing && chosen.len() > 1 {
			let mut tie_breaker =
				TieBreaker::new(&self.paradata, &mut *rng, request.is_remediation_search());
			chosen = tie_breaker.resolve_all(chosen);
		}

		debug_assert!(
			chosen
				.iter()
				.all(|c| match_concepts(c.record, request).extraneous.is_none())
		);

		metadata.records_selected = chosen.len();

		info!(
			%phase,
			admitted = metadata.records_admitted,
			skipped = metadata.records_skipped,
			selected = metadata.records_selected,
			"phase selection complete"
		);

		PhaseSelection {
			records: chosen.into_iter().map(CandidateResult::into_selected).collect(),
			failure: None,
			metadata,
		}
	}

	/// `Ok(None)` means the record does not fit this request; `Err` means it
	/// is broken and should not be looked at again.
	fn evaluate<'a>(
		&self,
		record: &'a ContentRecord,
		request: &SearchRequest,
		distinct_required: usize,
		validated: &mut BTreeSet<RecordId>,
	) -> Result<Option<CandidateResult<'a>>, SkipReason> {
		if let Some(reason) = filters::phase_rejection(record, request) {
			debug!(record = %record.id, reason, "phase mismatch");
			return Ok(None);
		}

		let matched = match_concepts(record, request);
		if let Some(concept) = &matched.extraneous {
			debug!(record = %record.id, %concept, "concept outside the search criteria");
			return Ok(None);
		}

		if !request.required_concepts.is_empty() && matched.covered_required.is_empty() {
			debug!(record = %record.id, "covers none of the required concepts");
			return Ok(None);
		}

		if request.validate_records && !validated.contains(&record.id) {
			self.validator.validate(record)?;
			validated.insert(record.id.clone());
		}

		let attribute_matches = self.scorer.score(record, &request.required_concepts);

		Ok(Some(CandidateResult {
			record,
			covers_all: matched.covers_all(distinct_required),
			covered: matched.covered_required.into_iter().collect(),
			delivered: request.already_delivered.contains(&record.reference),
			attribute_matches,
		}))
	}
}
