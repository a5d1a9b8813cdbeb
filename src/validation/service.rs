use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::checks::{parse_document, CheckError, Evaluator};
use crate::connections::ConnectionRegistry;
use crate::datasets::{DatasetError, DatasetStore};
use crate::history::{HistoryError, ResultStore};
use crate::model::{Connection, DatasetKind, ValidationRequest, ValidationResult};

/// Errors from a validation run
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid validation configuration: {0}")]
    Document(#[from] CheckError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("Validation of database datasets is not supported (connection '{0}')")]
    Unsupported(String),

    #[error("Failed to record result: {0}")]
    History(#[from] HistoryError),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for ValidationError {
    fn from(err: tokio::task::JoinError) -> Self {
        ValidationError::Task(err.to_string())
    }
}

/// Runs validations and records their results
#[derive(Clone)]
pub struct ValidationService {
    datasets: DatasetStore,
    connections: Arc<ConnectionRegistry>,
    results: Arc<dyn ResultStore>,
    evaluator: Evaluator,
}

impl ValidationService {
    pub fn new(
        datasets: DatasetStore,
        connections: Arc<ConnectionRegistry>,
        results: Arc<dyn ResultStore>,
        evaluator: Evaluator,
    ) -> Self {
        Self {
            datasets,
            connections,
            results,
            evaluator,
        }
    }

    pub fn results(&self) -> &Arc<dyn ResultStore> {
        &self.results
    }

    /// Execute a run and store its result before returning it
    /// Match `<connection>` exactly, else `<connection>.<table>` split at the last dot
    async fn resolve_connection(&self, dataset: &str) -> Option<Connection> {
        if let Some(conn) = self.connections.find_by_name(dataset).await {
            return Some(conn);
        }
        let (connection_name, _table) = dataset.rsplit_once('.')?;
        self.connections.find_by_name(connection_name).await
    }

    pub async fn run(&self, request: ValidationRequest) -> Result<ValidationResult, ValidationError> {
        let mut missing = Vec::new();
        if request.dataset.trim().is_empty() {
            missing.push("dataset");
        }
        if request.config.trim().is_empty() {
            missing.push("config");
        }
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let document = parse_document(&request.config)?;
        let dataset = request.dataset.trim().to_string();

        if request.dataset_type == DatasetKind::Database {
            return match self.resolve_connection(&dataset).await {
                Some(conn) => Err(ValidationError::Unsupported(conn.name)),
                None => Err(ValidationError::ConnectionNotFound(dataset)),
            };
        }

        let started = Instant::now();
        let table = self.datasets.load(&dataset).await?;

        let evaluator = self.evaluator.clone();
        let evaluation =
            tokio::task::spawn_blocking(move || evaluator.evaluate(&document, &table)).await?;

        let result = ValidationResult::new(dataset, evaluation.checks, evaluation.invalid_records);

        self.results.insert(&result).await?;

        tracing::info!(
            result_id = %result.id,
            dataset = %result.dataset,
            total = result.summary.total,
            passed = result.summary.passed,
            warnings = result.summary.warnings,
            failed = result.summary.failed,
            invalid_records = result.invalid_records.len(),
            truncated = evaluation.truncated,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Validation run completed"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryResultStore;
    use crate::model::{CheckStatus, NewConnection};
    use tempfile::{tempdir, TempDir};

    const CSV: &str = "id,email,status\n1,a@x.com,active\n2,,active\n3,a@x.com,deleted\n";

    async fn service() -> (TempDir, ValidationService) {
        let dir = tempdir().unwrap();
        let datasets = DatasetStore::open(dir.path()).unwrap();
        datasets
            .save("customers.csv", CSV.as_bytes().to_vec())
            .await
            .unwrap();

        let connections = Arc::new(ConnectionRegistry::new());
        connections
            .create(NewConnection::new("warehouse", "db", "dw", "etl"))
            .await
            .unwrap();

        let svc = ValidationService::new(
            datasets,
            connections,
            Arc::new(MemoryResultStore::new()),
            Evaluator::default(),
        );
        (dir, svc)
    }

    const CHECKS: &str = "checks for customers:\n  - row_count > 0\n  - missing_count(email) = 0\n  - warn: values in (status) in ('active')\n";

    #[tokio::test]
    async fn test_run_records_result() {
        let (_dir, svc) = service().await;

        let result = svc
            .run(ValidationRequest::new("customers.csv", CHECKS, DatasetKind::Csv))
            .await
            .unwrap();

        assert_eq!(result.dataset, "customers.csv");
        assert!(result.id.starts_with("customers-csv-"));
        assert!(result.is_consistent());
        assert_eq!(result.summary.total, 3);
        assert_eq!(result.checks[0].status, CheckStatus::Passed);
        assert_eq!(result.checks[1].status, CheckStatus::Failed);
        assert_eq!(result.checks[2].status, CheckStatus::Warning);
        assert_eq!(result.invalid_records.len(), 2);

        let history = svc.results().list().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, result.id);
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let (_dir, svc) = service().await;

        let err = svc
            .run(ValidationRequest::new(" ", "", DatasetKind::Csv))
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::MissingFields(ref f) if f == &["dataset", "config"]));
        assert!(svc.results().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_document() {
        let (_dir, svc) = service().await;

        let err = svc
            .run(ValidationRequest::new(
                "customers.csv",
                "checks for customers:\n  - frobnicate(x)\n",
                DatasetKind::Csv,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::Document(_)));
    }

    #[tokio::test]
    async fn test_unknown_dataset() {
        let (_dir, svc) = service().await;

        let err = svc
            .run(ValidationRequest::new("ghost.csv", CHECKS, DatasetKind::Csv))
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::Dataset(DatasetError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_database_runs() {
        let (_dir, svc) = service().await;

        let err = svc
            .run(ValidationRequest::new("warehouse.orders", CHECKS, DatasetKind::Database))
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::Unsupported(ref n) if n == "warehouse"));

        let err = svc
            .run(ValidationRequest::new("lake", CHECKS, DatasetKind::Database))
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::ConnectionNotFound(ref n) if n == "lake"));

        let err = svc
            .run(ValidationRequest::new("lake.orders", CHECKS, DatasetKind::Database))
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::ConnectionNotFound(ref n) if n == "lake.orders"));
    }

    #[tokio::test]
    async fn test_database_run_with_dotted_connection_name() {
        let (_dir, svc) = service().await;
        svc.connections
            .create(NewConnection::new("prod.eu", "db", "sales", "etl"))
            .await
            .unwrap();

        for dataset in ["prod.eu", "prod.eu.orders"] {
            let err = svc
                .run(ValidationRequest::new(dataset, CHECKS, DatasetKind::Database))
                .await
                .unwrap_err();
            assert!(
                matches!(err, ValidationError::Unsupported(ref n) if n == "prod.eu"),
                "{dataset}: {err}"
            );
        }
    }
}
