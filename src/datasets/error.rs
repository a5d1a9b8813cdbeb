//! Dataset store error types

use thiserror::Error;

/// Errors that can occur in the dataset store
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Name is not a plain `.csv` file name
    #[error("Invalid dataset name: {0}")]
    InvalidName(String),

    /// No dataset with this name
    #[error("Dataset {0} not found")]
    NotFound(String),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File exists but is not readable CSV
    #[error("Failed to read {name} as CSV: {message}")]
    Csv { name: String, message: String },

    /// Blocking worker failed
    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for DatasetError {
    fn from(err: tokio::task::JoinError) -> Self {
        DatasetError::Task(err.to_string())
    }
}

/// Result type alias for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;
