//! Datasets
//!
//! CSV uploads stored on disk and the in-memory table used for validation.

mod error;
mod store;
mod table;

pub use error::{DatasetError, DatasetResult};
pub use store::{validate_name, DatasetStore};
pub use table::{is_missing, Table};
