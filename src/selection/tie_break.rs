use rand::Rng;
use tracing::debug;

use crate::record::ContentRecord;
use crate::selection::candidates::CandidateResult;

/// Historical effectiveness ranking supplied by the host application.
pub trait ParadataRanker {
    /// Pick the most effective record, or `None` when the history cannot
    /// separate them.
    fn select_best<'a>(&self, records: &[&'a ContentRecord]) -> Option<&'a ContentRecord>;
}

/// Ranker for deployments without usage history.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoParadata;

impl ParadataRanker for NoParadata {
    fn select_best<'a>(&self, _records: &[&'a ContentRecord]) -> Option<&'a ContentRecord> {
        None
    }
}

/// Indices from `pool` whose content has not been delivered yet.
pub fn without_delivered(results: &[CandidateResult<'_>], pool: &[usize]) -> Vec<usize> {
    pool.iter().copied().filter(|&i| !results[i].delivered).collect()
}

/// Keep the indices with the highest attribute match count, plus every
/// non-passive record: attributes only exist on passive content, so a lower
/// count says nothing about the others.
pub fn best_attribute_matches(results: &[CandidateResult<'_>], pool: &[usize]) -> Vec<usize> {
    let highest = pool
        .iter()
        .map(|&i| results[i].attribute_matches)
        .max()
        .unwrap_or(0);

    pool.iter()
        .copied()
        .filter(|&i| results[i].attribute_matches == highest || !results[i].is_passive_content())
        .collect()
}

/// Resolves candidates that cover identical concepts down to one each.
pub struct TieBreaker<'a, P: ?Sized, R> {
    paradata: &'a P,
    rng: &'a mut R,
    remediation_search: bool,
}

impl<'a, P, R> TieBreaker<'a, P, R>
where
    P: ParadataRanker + ?Sized,
    R: Rng,
{
    pub fn new(paradata: &'a P, rng: &'a mut R, remediation_search: bool) -> Self {
        Self {
            paradata,
            rng,
            remediation_search,
        }
    }

    /// Position of the winner within a tied `group` (which must not be empty).
    pub fn resolve(&mut self, group: &[&CandidateResult<'_>]) -> usize {
        if self.remediation_search {
            let fresh_remedial: Vec<usize> = group
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.delivered && c.record.remediation_only)
                .map(|(i, _)| i)
                .collect();

            if !fresh_remedial.is_empty() {
                return fresh_remedial[self.rng.gen_range(0..fresh_remedial.len())];
            }
        }

        let records: Vec<&ContentRecord> = group.iter().map(|c| c.record).collect();
        if let Some(best) = self.paradata.select_best(&records) {
            if let Some(pos) = group.iter().position(|c| c.record.id == best.id) {
                return pos;
            }
            debug!(record = %best.id, "paradata picked a record outside the tied group");
        }

        self.rng.gen_range(0..group.len())
    }

    /// Repeatedly find the first group of candidates covering identical
    /// concepts and drop all but one of them, until no such group is left.
    pub fn resolve_all<'r>(&mut self, candidates: Vec<CandidateResult<'r>>) -> Vec<CandidateResult<'r>> {
        let mut working = candidates;
        working.sort_by(|a, b| b.covered.len().cmp(&a.covered.len()));

        while let Some(group) = first_tied_group(&working) {
            let members: Vec<&CandidateResult<'r>> = group.iter().map(|&i| &working[i]).collect();
            let winner = group[self.resolve(&members)];

            debug!(
                tied = group.len(),
                chosen = %working[winner].record.id,
                "resolved candidates covering the same concepts"
            );

            working = working
                .into_iter()
                .enumerate()
                .filter(|(i, _)| *i == winner || !group.contains(i))
                .map(|(_, c)| c)
                .collect();
        }

        working
    }
}

fn first_tied_group(working: &[CandidateResult<'_>]) -> Option<Vec<usize>> {
    (0..working.len()).find_map(|i| {
        let group: Vec<usize> = std::iter::once(i)
            .chain((i + 1..working.len()).filter(|&j| working[i].covers_same_concepts(&working[j])))
            .collect();
        (group.len() > 1).then_some(group)
    })
}
