//! # dqdash
//!
//! Data-quality dashboard backend: upload CSV datasets, register database
//! connections, run declarative checks against a dataset and browse or
//! export the results.
//!
//! ## Modules
//!
//! - [`checks`]: Check document parser and evaluator
//! - [`datasets`]: Uploaded CSV store
//! - [`connections`]: Database connection registry
//! - [`history`]: Validation result storage (memory or SQLite)
//! - [`validation`]: End-to-end validation runs
//! - [`export`]: JSON and CSV result export
//! - [`api`]: REST API server with Axum
//! - [`client`]: REST client and dashboard view state
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dqdash::checks::{parse_document, Evaluator};
//! use dqdash::datasets::Table;
//!
//! let table = Table::from_reader("id,email\n1,a@x.com\n2,\n".as_bytes())?;
//! let document = parse_document(
//!     "checks for customers:\n  - row_count > 0\n  - missing_count(email) = 0\n",
//! )?;
//!
//! let evaluation = Evaluator::default().evaluate(&document, &table);
//! for check in &evaluation.checks {
//!     println!("{} -> {} ({})", check.definition, check.result, check.status);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod api;
pub mod checks;
pub mod client;
pub mod config;
pub mod connections;
pub mod datasets;
pub mod export;
pub mod history;
pub mod logging;
pub mod model;
pub mod validation;

pub use model::{
    Ack, CheckStatus, Connection, Dataset, DatasetKind, InvalidRecord, NewConnection,
    ValidationCheck, ValidationRequest, ValidationResult, ValidationSummary,
};

pub use checks::{parse_document, CheckDocument, CheckError, Evaluator};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use client::{ClientConfig, ClientError, Dashboard, DashboardClient};

pub use config::{Config, ConfigError, LoggingConfig};

pub use history::{MemoryResultStore, ResultStore, ResultsBackend, SqliteResultStore};
