pub mod concept;
pub mod parser;
pub mod phase;
pub mod record;
pub mod validation;

pub use crate::types::identifiers::{RecordId, RecordVersion};
pub use concept::{names_match, ActivityKind, ActivityType, Concept};
pub use parser::{JsonRecordParser, RawRecord, RecordParseError, RecordParser};
pub use phase::Phase;
pub use record::ContentRecord;
pub use validation::{RecordValidator, StructuralValidator, ValidationError};
