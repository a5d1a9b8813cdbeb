//! Dashboard View State
//!
//! Holds what the dashboard shows (datasets, connections, history, the
//! current result) and the single error line. Each action calls the API
//! once per list it touches; on failure the error line is set and the lists
//! keep their previous contents.

use chrono::Utc;

use super::http::{ClientError, DashboardClient};
use crate::export::{export_filename, to_json, ExportFormat};
use crate::model::{
    CheckStatus, Connection, Dataset, DatasetKind, NewConnection, ValidationCheck,
    ValidationRequest, ValidationResult,
};

/// Which checks of the current result to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckFilter {
    #[default]
    All,
    Failed,
    Warning,
    Passed,
}

impl CheckFilter {
    fn accepts(&self, status: CheckStatus) -> bool {
        match self {
            CheckFilter::All => true,
            CheckFilter::Failed => status == CheckStatus::Failed,
            CheckFilter::Warning => status == CheckStatus::Warning,
            CheckFilter::Passed => status == CheckStatus::Passed,
        }
    }
}

/// A downloadable export produced locally
#[derive(Debug, Clone, PartialEq)]
pub struct ExportBlob {
    pub filename: String,
    pub contents: String,
}

pub struct Dashboard {
    client: DashboardClient,
    pub datasets: Vec<Dataset>,
    pub connections: Vec<Connection>,
    pub history: Vec<ValidationResult>,
    pub current: Option<ValidationResult>,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl Dashboard {
    pub fn new(client: DashboardClient) -> Self {
        Self {
            client,
            datasets: Vec::new(),
            connections: Vec::new(),
            history: Vec::new(),
            current: None,
            error: None,
            success: None,
        }
    }

    pub fn client(&self) -> &DashboardClient {
        &self.client
    }

    /// Record the outcome of a call; returns the value on success
    fn settle<T>(&mut self, outcome: Result<T, ClientError>) -> Option<T> {
        match outcome {
            Ok(value) => {
                self.error = None;
                Some(value)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Dashboard action failed");
                self.error = Some(e.to_string());
                self.success = None;
                None
            }
        }
    }

    fn succeed(&mut self, message: String) -> bool {
        self.error = None;
        self.success = Some(message);
        true
    }

    fn reject(&mut self, message: &str) -> bool {
        self.error = Some(message.to_string());
        self.success = None;
        false
    }

    /// Reload datasets, connections and history
    pub async fn refresh(&mut self) -> bool {
        let datasets = self.client.list_datasets().await;
        let Some(datasets) = self.settle(datasets) else {
            return false;
        };
        let connections = self.client.list_connections().await;
        let Some(connections) = self.settle(connections) else {
            return false;
        };
        let history = self.client.list_results().await;
        let Some(history) = self.settle(history) else {
            return false;
        };

        self.datasets = datasets;
        self.connections = connections;
        self.history = history;
        true
    }

    /// Upload a CSV file and add it to the dataset list
    pub async fn upload_dataset(&mut self, filename: &str, contents: Vec<u8>) -> bool {
        if filename.trim().is_empty() {
            return self.reject("Please select a file to upload");
        }
        if !filename.to_lowercase().ends_with(".csv") {
            return self.reject("Only CSV files are supported");
        }

        let outcome = self.client.upload_dataset(filename, contents).await;
        let Some(dataset) = self.settle(outcome) else {
            return false;
        };

        let message = format!("File {} uploaded successfully", dataset.name);
        self.datasets.retain(|d| d.name != dataset.name);
        self.datasets.push(dataset);
        self.datasets.sort_by(|a, b| a.name.cmp(&b.name));
        self.succeed(message)
    }

    pub async fn delete_dataset(&mut self, name: &str) -> bool {
        let outcome = self.client.delete_dataset(name).await;
        if self.settle(outcome).is_none() {
            return false;
        }
        self.datasets.retain(|d| d.name != name);
        self.succeed(format!("File {} deleted successfully", name))
    }

    /// Register a connection; a rejected form never adds a row
    pub async fn add_connection(&mut self, form: &NewConnection) -> bool {
        let outcome = self.client.create_connection(form).await;
        let Some(connection) = self.settle(outcome) else {
            return false;
        };
        let message = format!("Connection {} created successfully", connection.name);
        self.connections.push(connection);
        self.succeed(message)
    }

    pub async fn delete_connection(&mut self, id: u32) -> bool {
        let outcome = self.client.delete_connection(id).await;
        if self.settle(outcome).is_none() {
            return false;
        }
        self.connections.retain(|c| c.id != id);
        self.succeed("Connection deleted successfully".to_string())
    }

    /// Run a validation, make it current and refresh history
    pub async fn run_validation(&mut self, dataset: &str, config: &str, kind: DatasetKind) -> bool {
        if dataset.trim().is_empty() {
            return self.reject("Please select a dataset");
        }
        if config.trim().is_empty() {
            return self.reject("Please provide validation configuration");
        }

        self.success = None;
        let request = ValidationRequest::new(dataset, config, kind);
        let outcome = self.client.run_validation(&request).await;
        let Some(result) = self.settle(outcome) else {
            return false;
        };

        let summary = result.summary;
        self.current = Some(result);

        // A failed history refresh leaves its error showing instead
        let history = self.client.list_results().await;
        if let Some(history) = self.settle(history) {
            self.history = history;
            self.succeed(format!(
                "Validation completed successfully. {} passed, {} warnings, {} failed.",
                summary.passed, summary.warnings, summary.failed
            ));
        }
        true
    }

    /// Make a stored result current
    pub async fn open_result(&mut self, id: &str) -> bool {
        let outcome = self.client.get_result(id).await;
        let Some(result) = self.settle(outcome) else {
            return false;
        };
        self.current = Some(result);
        true
    }

    /// Checks of the current result matching `filter`
    pub fn checks(&self, filter: CheckFilter) -> Vec<&ValidationCheck> {
        self.current
            .iter()
            .flat_map(|r| r.checks.iter())
            .filter(|c| filter.accepts(c.status))
            .collect()
    }

    /// JSON export of the current result, built without a network call
    pub fn export_current_json(&self) -> Option<ExportBlob> {
        let result = self.current.as_ref()?;
        let contents = to_json(result).ok()?;
        Some(ExportBlob {
            filename: export_filename(result, ExportFormat::Json, Utc::now().date_naive()),
            contents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{CHECKS, CUSTOMERS};
    use crate::client::http::ClientConfig;
    use crate::client::tests::spawn_server;

    fn offline_dashboard() -> Dashboard {
        let client = DashboardClient::new(ClientConfig::new("http://127.0.0.1:9")).unwrap();
        Dashboard::new(client)
    }

    #[tokio::test]
    async fn test_local_guards() {
        let mut dashboard = offline_dashboard();

        assert!(!dashboard.run_validation("", CHECKS, DatasetKind::Csv).await);
        assert_eq!(dashboard.error.as_deref(), Some("Please select a dataset"));

        assert!(!dashboard.run_validation("a.csv", "   ", DatasetKind::Csv).await);
        assert_eq!(
            dashboard.error.as_deref(),
            Some("Please provide validation configuration")
        );

        assert!(!dashboard.upload_dataset("notes.txt", Vec::new()).await);
        assert_eq!(dashboard.error.as_deref(), Some("Only CSV files are supported"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_keeps_lists() {
        let mut dashboard = offline_dashboard();
        dashboard.datasets.push(Dataset::new(
            "kept.csv",
            10,
            1,
            1,
            Utc::now().date_naive(),
        ));

        assert!(!dashboard.refresh().await);
        assert!(dashboard
            .error
            .as_deref()
            .unwrap()
            .starts_with("Failed to fetch datasets: "));
        assert_eq!(dashboard.datasets.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_connection_adds_no_row() {
        let (url, _dir) = spawn_server().await;
        let mut dashboard = Dashboard::new(DashboardClient::new(ClientConfig::new(url)).unwrap());

        assert!(
            dashboard
                .add_connection(&NewConnection::new("prod", "db", "main", "admin"))
                .await
        );
        assert_eq!(dashboard.connections.len(), 1);

        assert_eq!(
            dashboard.success.as_deref(),
            Some("Connection prod created successfully")
        );

        let form = NewConnection::new("", "db", "main", "admin");
        assert!(!dashboard.add_connection(&form).await);
        assert_eq!(
            dashboard.error.as_deref(),
            Some("Failed to create connection: Missing required fields: name")
        );
        assert!(dashboard.success.is_none());
        assert_eq!(dashboard.connections.len(), 1);

        assert!(dashboard.refresh().await);
        assert_eq!(dashboard.connections.len(), 1);
        assert!(dashboard.error.is_none());
    }

    #[tokio::test]
    async fn test_run_updates_history() {
        let (url, _dir) = spawn_server().await;
        let mut dashboard = Dashboard::new(DashboardClient::new(ClientConfig::new(url)).unwrap());

        assert!(
            dashboard
                .upload_dataset("customers.csv", CUSTOMERS.as_bytes().to_vec())
                .await
        );
        assert!(dashboard.run_validation("customers.csv", CHECKS, DatasetKind::Csv).await);

        let current = dashboard.current.clone().unwrap();
        assert!(dashboard.history.iter().any(|r| r.id == current.id));
        assert_eq!(
            dashboard.success.as_deref(),
            Some("Validation completed successfully. 1 passed, 1 warnings, 1 failed.")
        );

        let failed = dashboard.checks(CheckFilter::Failed).len();
        let warning = dashboard.checks(CheckFilter::Warning).len();
        let passed = dashboard.checks(CheckFilter::Passed).len();
        assert_eq!(failed + warning + passed, current.summary.total);
        assert_eq!(dashboard.checks(CheckFilter::All).len(), current.summary.total);

        let blob = dashboard.export_current_json().unwrap();
        assert!(blob.filename.starts_with("validation-customers.csv-"));
        assert!(blob.filename.ends_with(".json"));

        assert!(dashboard.open_result(&current.id).await);
        assert!(!dashboard.open_result("missing").await);
        assert_eq!(dashboard.current.as_ref().map(|r| &r.id), Some(&current.id));
    }

    #[tokio::test]
    async fn test_success_messages() {
        let (url, _dir) = spawn_server().await;
        let mut dashboard = Dashboard::new(DashboardClient::new(ClientConfig::new(url)).unwrap());

        assert!(
            dashboard
                .upload_dataset("customers.csv", CUSTOMERS.as_bytes().to_vec())
                .await
        );
        assert_eq!(
            dashboard.success.as_deref(),
            Some("File customers.csv uploaded successfully")
        );
        assert!(dashboard.error.is_none());

        assert!(!dashboard.delete_dataset("missing.csv").await);
        assert!(dashboard.error.is_some());
        assert!(dashboard.success.is_none());

        assert!(dashboard.delete_dataset("customers.csv").await);
        assert_eq!(
            dashboard.success.as_deref(),
            Some("File customers.csv deleted successfully")
        );
        assert!(dashboard.error.is_none());
        assert!(dashboard.datasets.is_empty());

        assert!(
            dashboard
                .add_connection(&NewConnection::new("prod", "db", "main", "admin"))
                .await
        );
        let id = dashboard.connections[0].id;
        assert!(dashboard.delete_connection(id).await);
        assert_eq!(
            dashboard.success.as_deref(),
            Some("Connection deleted successfully")
        );
        assert!(dashboard.connections.is_empty());
    }

    #[tokio::test]
    async fn test_history_failure_after_run_shows_only_error() {
        use axum::{
            http::StatusCode,
            routing::{get, post},
            Json, Router,
        };

        let app = Router::new()
            .route(
                "/validation/run",
                post(|| async {
                    Json(ValidationResult::new("customers.csv", Vec::new(), Vec::new()))
                }),
            )
            .route(
                "/validation/results",
                get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut dashboard = Dashboard::new(DashboardClient::new(ClientConfig::new(url)).unwrap());
        assert!(dashboard.run_validation("customers.csv", CHECKS, DatasetKind::Csv).await);

        assert!(dashboard.current.is_some());
        assert_eq!(
            dashboard.error.as_deref(),
            Some("Failed to fetch validation results: Internal Server Error")
        );
        assert!(dashboard.success.is_none());
    }
}
