use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::record::ContentRecord;
use crate::selection::combinations::{Combinations, TierProduct};
use crate::selection::config::SelectionConfig;
use crate::selection::filters::group_by_activity;
use crate::selection::tie_break::{best_attribute_matches, without_delivered};
use crate::types::selection_bundle::{PhaseFailure, SearchRequest, SelectedRecord, SelectionWhy};

/// A description that passed filtering for one request, with the facts the
/// ranking steps need.
#[derive(Debug, Clone)]
pub struct CandidateResult<'a> {
    pub record: &'a ContentRecord,
    /// Required concept names covered, spelled as in the request.
    pub covered: BTreeSet<String>,
    pub covers_all: bool,
    pub delivered: bool,
    pub attribute_matches: usize,
}

impl PartialEq for CandidateResult<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.record.id == other.record.id
            && self.covers_all == other.covers_all
            && self.attribute_matches == other.attribute_matches
            && self.covered == other.covered
    }
}

impl Eq for CandidateResult<'_> {}

impl<'a> CandidateResult<'a> {
    pub fn covers_same_concepts(&self, other: &CandidateResult<'_>) -> bool {
        self.covered == other.covered
    }

    pub fn is_passive_content(&self) -> bool {
        self.record.is_passive_content()
    }

    pub fn into_selected(self) -> SelectedRecord {
        SelectedRecord {
            record: self.record.clone(),
            why: SelectionWhy {
                covered_concepts: self.covered.into_iter().collect(),
                covers_all_concepts: self.covers_all,
                attribute_matches: self.attribute_matches,
                already_delivered: self.delivered,
            },
        }
    }
}

/// Indices chosen by `CandidateBuilder::build`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSet {
    /// Every admitted record, returned as is.
    Listing(Vec<usize>),
    /// The best covering records; some may still cover identical concepts.
    Selected(Vec<usize>),
}

impl CandidateSet {
    pub fn indices(&self) -> &[usize] {
        match self {
            CandidateSet::Listing(indices) | CandidateSet::Selected(indices) => indices,
        }
    }

    pub fn into_indices(self) -> Vec<usize> {
        match self {
            CandidateSet::Listing(indices) | CandidateSet::Selected(indices) => indices,
        }
    }

    pub fn is_listing(&self) -> bool {
        matches!(self, CandidateSet::Listing(_))
    }
}

/// Chooses which admitted candidates form the answer to one request.
///
/// Works on indices into the admitted candidate list so that the caller
/// keeps ownership of the results.
pub struct CandidateBuilder<'r> {
    request: &'r SearchRequest,
    config: &'r SelectionConfig,
    distinct_required: usize,
}

impl<'r> CandidateBuilder<'r> {
    pub fn new(request: &'r SearchRequest, config: &'r SelectionConfig) -> Self {
        Self {
            request,
            config,
            distinct_required: request.distinct_required_names().len(),
        }
    }

    pub fn build(&self, results: &[CandidateResult<'_>]) -> Result<CandidateSet, PhaseFailure> {
        let highest = results.iter().map(|r| r.covered.len()).max().unwrap_or(0);
        if highest == 0 || !self.request.apply_selection_logic {
            return Ok(CandidateSet::Listing((0..results.len()).collect()));
        }

        self.select(results).map(CandidateSet::Selected)
    }

    fn select(&self, results: &[CandidateResult<'_>]) -> Result<Vec<usize>, PhaseFailure> {
        let all: Vec<usize> = (0..results.len()).collect();

        if results.len() == 1 {
            return Ok(self.alone(results, 0));
        }

        // Step 1: activity prioritization
        let records: Vec<&ContentRecord> = results.iter().map(|r| r.record).collect();
        let grouped = group_by_activity(&records, self.request);

        if grouped.len() == self.distinct_required {
            let first_tiers: BTreeSet<usize> = grouped
                .iter()
                .flat_map(|g| g.tiers[0].iter().copied())
                .collect();

            if first_tiers.len() == 1 {
                debug!("a single description holds the preferred activity for every concept");
                return Ok(first_tiers.into_iter().collect());
            }
        } else {
            debug!(
                concepts_with_activity = grouped.len(),
                concepts = self.distinct_required,
                "not every concept has content with a requested activity"
            );
        }

        // Step 2: try pools in activity priority order
        let sizes: Vec<usize> = grouped.iter().map(|g| g.tiers.len()).collect();
        let combinations = TierProduct::count(&sizes).unwrap_or(usize::MAX);
        if combinations > self.config.max_tier_combinations {
            warn!(
                combinations,
                limit = self.config.max_tier_combinations,
                "too many activity tier combinations"
            );
            return Err(PhaseFailure::TierOverflow {
                combinations,
                limit: self.config.max_tier_combinations,
            });
        }

        for choice in TierProduct::new(sizes) {
            let pool: BTreeSet<usize> = grouped
                .iter()
                .zip(&choice)
                .flat_map(|(g, &tier)| g.tiers[tier].iter().copied())
                .collect();
            if pool.is_empty() {
                continue;
            }

            let pool: Vec<usize> = pool.into_iter().collect();
            let selected = self.populate(results, &pool, true)?;
            if !selected.is_empty() {
                debug!(pool = pool.len(), selected = selected.len(), "activity pool satisfied the request");
                return Ok(selected);
            }
        }

        // Step 3: ignore activity priority
        let selected = self.populate(results, &all, true)?;
        if !selected.is_empty() {
            return Ok(selected);
        }
        self.populate(results, &all, false)
    }

    /// Select from `pool`, preferring a record that covers everything, then
    /// the smallest jointly covering set.
    fn populate(
        &self,
        results: &[CandidateResult<'_>],
        pool: &[usize],
        skip_delivered: bool,
    ) -> Result<Vec<usize>, PhaseFailure> {
        let mut ordered = if skip_delivered {
            without_delivered(results, pool)
        } else {
            pool.to_vec()
        };

        // stable: ties keep catalog order
        ordered.sort_by(|&a, &b| results[b].covered.len().cmp(&results[a].covered.len()));

        let full: Vec<usize> = ordered
            .iter()
            .copied()
            .filter(|&i| results[i].covers_all)
            .collect();

        if !full.is_empty() {
            return Ok(best_attribute_matches(results, &full));
        }

        if !ordered.is_empty() {
            return self.smallest_covering_sets(results, &ordered);
        }

        if skip_delivered {
            debug!("every candidate was already delivered, considering delivered content");
            return self.populate(results, pool, false);
        }

        Ok(Vec::new())
    }

    /// Enumerate subsets of growing size and keep the best ones of the
    /// first size that has any.
    fn smallest_covering_sets(
        &self,
        results: &[CandidateResult<'_>],
        candidates: &[usize],
    ) -> Result<Vec<usize>, PhaseFailure> {
        if candidates.len() == 1 {
            return Ok(self.alone(results, candidates[0]));
        }

        if !self.request.any_subset_allowed && !self.jointly_covers(results, candidates) {
            debug!(candidates = candidates.len(), "candidates cannot cover every concept together");
            return Ok(Vec::new());
        }

        let limit = self.config.max_enumeration_candidates;
        if candidates.len() > limit {
            warn!(candidates = candidates.len(), limit, "too many candidates to enumerate");
            return Err(PhaseFailure::EnumerationOverflow {
                candidates: candidates.len(),
                limit,
            });
        }

        let n = candidates.len();
        for k in 2..=n {
            let mut winners: Vec<Vec<usize>> = Vec::new();
            let mut best_coverage = usize::MAX;
            let mut best_attributes = 0;

            for combo in Combinations::new(n, k) {
                let members: Vec<usize> = combo.iter().map(|&c| candidates[c]).collect();

                if self.has_redundant_member(results, &members) {
                    continue;
                }

                if !self.request.any_subset_allowed && !self.jointly_covers(results, &members) {
                    continue;
                }

                let coverage: usize = members.iter().map(|&m| results[m].covered.len()).sum();
                let attributes: usize = members.iter().map(|&m| results[m].attribute_matches).sum();

                if coverage < best_coverage
                    || (coverage == best_coverage && attributes > best_attributes)
                {
                    winners.clear();
                    best_coverage = coverage;
                    best_attributes = attributes;
                    winners.push(members);
                } else if coverage == best_coverage && attributes == best_attributes {
                    winners.push(members);
                }
            }

            if !winners.is_empty() {
                debug!(size = k, sets = winners.len(), "found covering content sets");

                let mut union = Vec::new();
                for member in winners.into_iter().flatten() {
                    if !union.contains(&member) {
                        union.push(member);
                    }
                }
                return Ok(union);
            }
        }

        if self.request.any_subset_allowed {
            // every candidate is acceptable by itself; ties collapse later
            return Ok(candidates.to_vec());
        }

        Ok(Vec::new())
    }

    fn has_redundant_member(&self, results: &[CandidateResult<'_>], members: &[usize]) -> bool {
        members.iter().enumerate().any(|(i, &a)| {
            members[i + 1..]
                .iter()
                .any(|&b| results[a].covers_same_concepts(&results[b]))
        })
    }

    fn jointly_covers(&self, results: &[CandidateResult<'_>], members: &[usize]) -> bool {
        let covered: BTreeSet<&str> = members
            .iter()
            .flat_map(|&m| results[m].covered.iter().map(String::as_str))
            .collect();
        covered.len() == self.distinct_required
    }

    fn acceptable_alone(&self, result: &CandidateResult<'_>) -> bool {
        self.request.any_subset_allowed || self.distinct_required == 0 || result.covers_all
    }

    fn alone(&self, results: &[CandidateResult<'_>], idx: usize) -> Vec<usize> {
        if self.acceptable_alone(&results[idx]) {
            vec![idx]
        } else {
            debug!(record = %results[idx].record.id, "lone candidate does not cover every concept");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Concept, Phase, RecordId};

    fn record(id: &str, concepts: &[&str]) -> ContentRecord {
        ContentRecord::new(
            RecordId::new(id),
            format!("{id}.html"),
            concepts.iter().map(|c| Concept::active(*c)).collect(),
            Some(Phase::Rule),
            false,
        )
    }

    fn candidate<'a>(record: &'a ContentRecord, required: usize) -> CandidateResult<'a> {
        let covered: BTreeSet<String> = record.concepts.iter().map(|c| c.name.clone()).collect();
        CandidateResult {
            record,
            covers_all: covered.len() == required,
            covered,
            delivered: false,
            attribute_matches: 0,
        }
    }

    fn request(concepts: &[&str]) -> SearchRequest {
        concepts
            .iter()
            .fold(SearchRequest::for_phase(Phase::Rule), |r, c| r.require(Concept::active(*c)))
    }

    #[test]
    fn prefers_fewest_repeated_concepts() {
        // {A,B}+{C} repeats nothing, {A,B}+{B,C} repeats B
        let ab = record("ab", &["A", "B"]);
        let bc = record("bc", &["B", "C"]);
        let c = record("c", &["C"]);
        let req = request(&["A", "B", "C"]);
        let config = SelectionConfig::v0();
        let builder = CandidateBuilder::new(&req, &config);

        let results = vec![candidate(&ab, 3), candidate(&bc, 3), candidate(&c, 3)];
        let chosen = builder.build(&results).unwrap().into_indices();

        let ids: BTreeSet<&str> = chosen.iter().map(|&i| results[i].record.id.as_str()).collect();
        assert_eq!(ids, BTreeSet::from(["ab", "c"]));
    }

    #[test]
    fn attribute_matches_break_coverage_ties() {
        let a1 = record("a1", &["A"]);
        let a2 = record("a2", &["A"]);
        let b = record("b", &["B"]);
        let req = request(&["A", "B"]);
        let config = SelectionConfig::v0();
        let builder = CandidateBuilder::new(&req, &config);

        let mut results = vec![candidate(&a1, 2), candidate(&a2, 2), candidate(&b, 2)];
        results[1].attribute_matches = 2;

        let chosen = builder.build(&results).unwrap().into_indices();
        let ids: BTreeSet<&str> = chosen.iter().map(|&i| results[i].record.id.as_str()).collect();
        assert_eq!(ids, BTreeSet::from(["a2", "b"]));
    }

    #[test]
    fn overflow_is_reported() {
        let mut records: Vec<ContentRecord> = (0..4).map(|i| record(&format!("r{i}"), &["A"])).collect();
        records.push(record("b", &["B"]));
        let req = request(&["A", "B"]);
        let config = SelectionConfig {
            max_enumeration_candidates: 3,
            ..SelectionConfig::v0()
        };
        let builder = CandidateBuilder::new(&req, &config);

        let results: Vec<CandidateResult> = records.iter().map(|r| candidate(r, 2)).collect();
        assert_eq!(
            builder.build(&results),
            Err(PhaseFailure::EnumerationOverflow {
                candidates: 5,
                limit: 3
            })
        );
    }

    #[test]
    fn delivered_content_is_used_when_nothing_else_covers() {
        let a = record("a", &["A"]);
        let b = record("b", &["B"]);
        let req = request(&["A", "B"]);
        let config = SelectionConfig::v0();
        let builder = CandidateBuilder::new(&req, &config);

        let mut results = vec![candidate(&a, 2), candidate(&b, 2)];
        results[1].delivered = true;

        let chosen = builder.build(&results).unwrap().into_indices();
        assert_eq!(chosen.len(), 2);
    }

    #[test]
    fn partial_content_stands_alone_only_when_allowed() {
        let a = record("a", &["A"]);
        let config = SelectionConfig::v0();

        let strict = request(&["A", "B"]);
        let results = vec![candidate(&a, 2)];
        assert!(CandidateBuilder::new(&strict, &config).build(&results).unwrap().indices().is_empty());

        let lenient = request(&["A", "B"]).any_subset(true);
        assert_eq!(
            CandidateBuilder::new(&lenient, &config).build(&results),
            Ok(CandidateSet::Selected(vec![0]))
        );
    }

    #[test]
    fn uncoverable_request_returns_nothing_before_the_limit() {
        // 5 candidates over a limit of 3 would overflow if enumerated
        let records: Vec<ContentRecord> = (0..5).map(|i| record(&format!("r{i}"), &["A"])).collect();
        let req = request(&["A", "B"]);
        let config = SelectionConfig {
            max_enumeration_candidates: 3,
            ..SelectionConfig::v0()
        };
        let builder = CandidateBuilder::new(&req, &config);

        let results: Vec<CandidateResult> = records.iter().map(|r| candidate(r, 2)).collect();
        assert_eq!(builder.build(&results), Ok(CandidateSet::Selected(Vec::new())));
    }

    #[test]
    fn listing_is_reported_as_such() {
        let a = record("a", &["A"]);
        let b = record("b", &["B"]);
        let config = SelectionConfig::v0();

        let listing = request(&["A", "B"]).listing();
        let results = vec![candidate(&a, 2), candidate(&b, 2)];
        let built = CandidateBuilder::new(&listing, &config).build(&results).unwrap();
        assert!(built.is_listing());
        assert_eq!(built.indices(), &[0, 1]);

        let unconstrained = SearchRequest::for_phase(Phase::Rule);
        let mut loose = vec![candidate(&a, 0), candidate(&b, 0)];
        for result in &mut loose {
            result.covered.clear();
            result.covers_all = false;
        }
        assert_eq!(
            CandidateBuilder::new(&unconstrained, &config).build(&loose),
            Ok(CandidateSet::Listing(vec![0, 1]))
        );
    }
}
