pub mod identifiers;
pub mod selection_bundle;

pub use identifiers::{RecordId, RecordIdError, RecordVersion};
pub use selection_bundle::{
    PhaseFailure, PhaseMetadata, PhaseSelection, SearchRequest, SelectedRecord, SelectionError,
    SelectionOutcome, SelectionWhy,
};
