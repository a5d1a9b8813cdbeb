//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::checks::{EvaluationOptions, Evaluator};
use crate::config::{Config, ServerConfig};
use crate::connections::ConnectionRegistry;
use crate::datasets::{DatasetError, DatasetStore};
use crate::history::{self, HistoryError, ResultStore};
use crate::validation::ValidationService;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Uploaded CSV datasets
    pub datasets: DatasetStore,
    /// Registered database connections
    pub connections: Arc<ConnectionRegistry>,
    /// Validation result history
    pub results: Arc<dyn ResultStore>,
    /// Runs validations and records them in `results`
    pub validation: ValidationService,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        datasets: DatasetStore,
        results: Arc<dyn ResultStore>,
        evaluator: Evaluator,
        config: ApiConfig,
    ) -> Self {
        let connections = Arc::new(ConnectionRegistry::new());
        let validation = ValidationService::new(
            datasets.clone(),
            Arc::clone(&connections),
            Arc::clone(&results),
            evaluator,
        );

        Self {
            datasets,
            connections,
            results,
            validation,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Open the stores named by `config`
    pub fn from_config(config: &Config) -> Result<Self, StateError> {
        let datasets = DatasetStore::open(config.storage.uploads_dir())?;
        let results = history::open_store(config.storage.results_backend, &config.storage.data_path())?;
        let evaluator = Evaluator::new(EvaluationOptions {
            max_invalid_records: config.validation.max_invalid_records,
        });

        Ok(Self::new(
            datasets,
            results,
            evaluator,
            ApiConfig::from(&config.server),
        ))
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// Errors opening application state
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to open dataset store: {0}")]
    Datasets(#[from] DatasetError),

    #[error("Failed to open result history: {0}")]
    History(#[from] HistoryError),
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for ApiConfig {
    fn from(server: &ServerConfig) -> Self {
        Self {
            host: server.host.clone(),
            port: server.port,
            max_body_size: server.max_body_size(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
