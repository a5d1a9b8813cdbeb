//! Dashboard REST Client
//!
//! HTTP client for the dqdash API. Every failure is reported as a
//! `ClientError` whose message reads `Failed to <action>: <detail>`.

use reqwest::{multipart, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::api::dto::HealthResponse;
use crate::api::ErrorResponse;
use crate::model::{Ack, Connection, Dataset, NewConnection, ValidationRequest, ValidationResult};

/// Default API location
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Configuration for the dashboard client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "http://localhost:8000")
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// `--api-url` wins over `DQDASH_API_URL`, which wins over the default
    pub fn resolve(flag: Option<String>) -> Self {
        let url = flag
            .or_else(|| std::env::var("DQDASH_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::new(url)
    }
}

/// Client-side failures, each naming the action that failed
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to {action}: request timed out")]
    Timeout { action: &'static str },

    #[error("Failed to {action}: server unavailable")]
    Unavailable { action: &'static str },

    #[error("Failed to {action}: {message}")]
    Api {
        action: &'static str,
        status: u16,
        message: String,
    },

    #[error("Failed to {action}: {source}")]
    Request {
        action: &'static str,
        source: reqwest::Error,
    },
}

impl ClientError {
    fn from_reqwest(action: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout { action }
        } else if err.is_connect() {
            ClientError::Unavailable { action }
        } else {
            ClientError::Request {
                action,
                source: err,
            }
        }
    }

    /// HTTP status returned by the server, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// dqdash REST API client
#[derive(Clone)]
pub struct DashboardClient {
    client: Client,
    config: ClientConfig,
}

impl DashboardClient {
    /// Create a client with the given configuration
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::from_reqwest("create HTTP client", e))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// GET /health
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.client.get(self.url("/health")).send().await;
        json_body("fetch status", response).await
    }

    /// GET /datasets
    pub async fn list_datasets(&self) -> Result<Vec<Dataset>, ClientError> {
        let response = self.client.get(self.url("/datasets")).send().await;
        json_body("fetch datasets", response).await
    }

    /// POST /datasets/upload
    pub async fn upload_dataset(
        &self,
        filename: &str,
        contents: Vec<u8>,
    ) -> Result<Dataset, ClientError> {
        const ACTION: &str = "upload dataset";

        let part = multipart::Part::bytes(contents)
            .file_name(filename.to_string())
            .mime_str("text/csv")
            .map_err(|e| ClientError::from_reqwest(ACTION, e))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/datasets/upload"))
            .multipart(form)
            .send()
            .await;
        json_body(ACTION, response).await
    }

    /// DELETE /datasets/:filename
    pub async fn delete_dataset(&self, filename: &str) -> Result<Ack, ClientError> {
        let path = format!("/datasets/{}", urlencoding::encode(filename));
        let response = self.client.delete(self.url(&path)).send().await;
        json_body("delete dataset", response).await
    }

    /// GET /connections
    pub async fn list_connections(&self) -> Result<Vec<Connection>, ClientError> {
        let response = self.client.get(self.url("/connections")).send().await;
        json_body("fetch connections", response).await
    }

    /// POST /connections
    pub async fn create_connection(&self, form: &NewConnection) -> Result<Connection, ClientError> {
        self.post_json("create connection", "/connections", form).await
    }

    /// DELETE /connections/:id
    pub async fn delete_connection(&self, id: u32) -> Result<Ack, ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/connections/{}", id)))
            .send()
            .await;
        json_body("delete connection", response).await
    }

    /// POST /validation/run
    pub async fn run_validation(
        &self,
        request: &ValidationRequest,
    ) -> Result<ValidationResult, ClientError> {
        self.post_json("run validation", "/validation/run", request).await
    }

    /// GET /validation/results
    pub async fn list_results(&self) -> Result<Vec<ValidationResult>, ClientError> {
        let response = self.client.get(self.url("/validation/results")).send().await;
        json_body("fetch validation results", response).await
    }

    /// GET /validation/results/:id
    pub async fn get_result(&self, id: &str) -> Result<ValidationResult, ClientError> {
        let path = format!("/validation/results/{}", urlencoding::encode(id));
        let response = self.client.get(self.url(&path)).send().await;
        json_body("fetch validation result", response).await
    }

    /// GET /export/json/:id
    pub async fn export_json(&self, id: &str) -> Result<String, ClientError> {
        let path = format!("/export/json/{}", urlencoding::encode(id));
        let response = self.client.get(self.url(&path)).send().await;
        text_body("export JSON", response).await
    }

    /// GET /export/csv/:id
    pub async fn export_csv(&self, id: &str) -> Result<String, ClientError> {
        let path = format!("/export/csv/{}", urlencoding::encode(id));
        let response = self.client.get(self.url(&path)).send().await;
        text_body("export CSV", response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        action: &'static str,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.client.post(self.url(path)).json(body).send().await;
        json_body(action, response).await
    }
}

/// Turn a non-2xx response into `ClientError::Api`
async fn check(
    action: &'static str,
    response: Result<Response, reqwest::Error>,
) -> Result<Response, ClientError> {
    let response = response.map_err(|e| ClientError::from_reqwest(action, e))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    Err(ClientError::Api {
        action,
        status: status.as_u16(),
        message: error_detail(status, &text),
    })
}

/// The server's `error.message`, else the HTTP reason phrase
fn error_detail(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        })
}

async fn json_body<T: DeserializeOwned>(
    action: &'static str,
    response: Result<Response, reqwest::Error>,
) -> Result<T, ClientError> {
    check(action, response)
        .await?
        .json()
        .await
        .map_err(|e| ClientError::from_reqwest(action, e))
}

async fn text_body(
    action: &'static str,
    response: Result<Response, reqwest::Error>,
) -> Result<String, ClientError> {
    check(action, response)
        .await?
        .text()
        .await
        .map_err(|e| ClientError::from_reqwest(action, e))
}
