//! Validation History
//!
//! Append-only store of completed validation results. Two backends:
//! - `MemoryResultStore` (lost on restart)
//! - `SqliteResultStore` (`results.db` under the data directory)

mod memory;
mod sqlite;

pub use memory::MemoryResultStore;
pub use sqlite::SqliteResultStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::model::ValidationResult;

/// Storage for validation results
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Backend name for logs and health output
    fn name(&self) -> &str;

    /// Append a result
    async fn insert(&self, result: &ValidationResult) -> Result<(), HistoryError>;

    /// All results in run order, oldest first
    async fn list(&self) -> Result<Vec<ValidationResult>, HistoryError>;

    /// Look up a single result
    async fn get(&self, id: &str) -> Result<Option<ValidationResult>, HistoryError>;

    /// Number of stored results, without decoding them
    async fn count(&self) -> Result<usize, HistoryError>;
}

/// Which result store backs the history
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResultsBackend {
    Memory,
    #[default]
    Sqlite,
}

impl std::str::FromStr for ResultsBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("unknown results backend '{}'", other)),
        }
    }
}

/// Open the configured result store
pub fn open_store(
    backend: ResultsBackend,
    data_dir: &Path,
) -> Result<Arc<dyn ResultStore>, HistoryError> {
    let store: Arc<dyn ResultStore> = match backend {
        ResultsBackend::Memory => Arc::new(MemoryResultStore::new()),
        ResultsBackend::Sqlite => Arc::new(SqliteResultStore::open(data_dir)?),
    };
    tracing::info!(backend = store.name(), "Opened result store");
    Ok(store)
}

/// Errors from the result store
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt stored result {id}: {message}")]
    Corrupt { id: String, message: String },

    #[error("Result {0} already stored")]
    DuplicateId(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for HistoryError {
    fn from(err: tokio::task::JoinError) -> Self {
        HistoryError::Task(err.to_string())
    }
}
