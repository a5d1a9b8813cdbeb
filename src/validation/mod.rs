//! Validation Runs
//!
//! Drives one run end to end: presence checks, document parsing, dataset
//! loading, evaluation on the blocking pool and recording in history.

mod service;

pub use service::{ValidationError, ValidationService};
