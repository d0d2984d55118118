// Read-only once built:
// records sorted by id
// no duplicate ids
// parse failures already dropped

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::catalog::source::CatalogSource;
use crate::record::{ContentRecord, Phase, RecordParser};
use crate::types::identifiers::RecordId;

#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<ContentRecord>,
    /// Descriptions that could not be parsed when the catalog was loaded.
    pub dropped: Vec<RecordId>,
    pub loaded_at: DateTime<Utc>, // informational only
}

impl Catalog {
    pub fn from_records(records: Vec<ContentRecord>) -> Self {
        let mut sorted = records;
        sorted.sort_by(|a, b| a.id.cmp(&b.id));

        // Duplicates are adjacent after the sort; keep the first.
        sorted.dedup_by(|later, earlier| {
            let duplicate = later.id == earlier.id;
            if duplicate {
                warn!(record = %later.id, "dropping duplicate description id");
            }
            duplicate
        });

        Catalog {
            records: sorted,
            dropped: Vec::new(),
            loaded_at: Utc::now(),
        }
    }

    /// Enumerate and parse every description the source offers.
    ///
    /// A failing source yields an empty catalog; a failing description is
    /// logged and left out.
    pub fn load<S, P>(source: &S, parser: &P) -> Self
    where
        S: CatalogSource + ?Sized,
        P: RecordParser + ?Sized,
    {
        let raw_records = match source.list_description_records() {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to enumerate content descriptions");
                return Catalog::from_records(Vec::new());
            }
        };

        let mut parsed = Vec::with_capacity(raw_records.len());
        let mut dropped = Vec::new();
        for raw in &raw_records {
            match parser.parse(raw) {
                Ok(record) => parsed.push(record),
                Err(e) => {
                    warn!(record = %raw.id, error = %e, "ignoring description that failed to parse");
                    dropped.push(raw.id.clone());
                }
            }
        }

        info!(
            found = raw_records.len(),
            parsed = parsed.len(),
            dropped = dropped.len(),
            "loaded content catalog"
        );

        let mut catalog = Catalog::from_records(parsed);
        catalog.dropped = dropped;
        catalog
    }

    pub fn records(&self) -> &[ContentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&ContentRecord> {
        self.records
            .binary_search_by(|r| r.id.cmp(id))
            .ok()
            .map(|idx| &self.records[idx])
    }

    /// Descriptions that point at `content`, optionally restricted to those
    /// tagged with exactly `phase`.
    ///
    /// Matching is a suffix match on the slash-normalized content path, so a
    /// description referencing `media/intro.mp4` is found for
    /// `course/media/intro.mp4`.
    pub fn find_records_referencing(
        &self,
        content: &str,
        phase: Option<Phase>,
    ) -> Vec<&ContentRecord> {
        let content = content.replace('\\', "/");

        self.records
            .iter()
            .filter(|record| {
                let reference = record.reference.replace('\\', "/");
                !reference.is_empty() && content.ends_with(&reference)
            })
            .filter(|record| phase.map_or(true, |p| record.phase == Some(p)))
            .collect()
    }
}
