//! Concept-driven content selection for adaptive courseware.
//!
//! `content-core` loads content description records into a catalog and, for
//! each instructional phase a learner is in, picks the smallest set of
//! records that together cover the requested concepts. Candidate building is
//! deterministic; the only randomness is the final tie-break between records
//! that cover identical concepts, and callers can pin it with a seeded RNG.

pub mod catalog;
pub mod record;
pub mod selection;
pub mod types;
