//! Validation API data model
//!
//! Types exchanged between the validation service and its clients.

mod types;

pub use types::{
    format_size, result_id, Ack, CheckStatus, Connection, Dataset, DatasetKind, InvalidRecord,
    NewConnection, ValidationCheck, ValidationRequest, ValidationResult, ValidationSummary,
    DEFAULT_DB_PORT,
};
