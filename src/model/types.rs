//! Core data types shared by the validation service and the dashboard client
//!
//! This module defines the wire types of the validation API:
//! - `Dataset`: An uploaded CSV source
//! - `Connection` / `NewConnection`: A database endpoint and its create form
//! - `ValidationRequest`: Input to a validation run
//! - `ValidationResult`: The immutable outcome of a run, with its
//!   `ValidationSummary`, `ValidationCheck`s and `InvalidRecord`s

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default PostgreSQL port used when a connection form omits one
pub const DEFAULT_DB_PORT: u16 = 5432;

/// An uploaded CSV dataset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    /// File name, also the dataset identifier
    pub name: String,
    /// Human readable size, e.g. "1.2 MB"
    pub size: String,
    /// Raw size in bytes
    #[serde(default)]
    pub size_bytes: u64,
    /// Number of data rows (header excluded)
    pub rows: usize,
    /// Number of columns in the header
    pub columns: usize,
    /// Upload (modification) date
    pub date: NaiveDate,
}

impl Dataset {
    pub fn new(
        name: impl Into<String>,
        size_bytes: u64,
        rows: usize,
        columns: usize,
        date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            size: format_size(size_bytes),
            size_bytes,
            rows,
            columns,
            date,
        }
    }
}

/// Format a byte count the way the dataset list shows it
pub fn format_size(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

/// Kind of source a validation run targets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    #[default]
    Csv,
    Database,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Csv => "csv",
            DatasetKind::Database => "database",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(DatasetKind::Csv),
            "database" | "db" => Ok(DatasetKind::Database),
            other => Err(format!("Unknown dataset type: {} (use csv or database)", other)),
        }
    }
}

/// A registered database connection as returned by the API
///
/// Credentials are write-only and never appear here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Connection {
    pub id: u32,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    /// Number of tables reported for the connection
    pub tables: u32,
}

/// Connection create form
///
/// String fields default to empty so that absent fields reach presence
/// validation instead of failing JSON extraction.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct NewConnection {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn default_port() -> u16 {
    DEFAULT_DB_PORT
}

impl NewConnection {
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: DEFAULT_DB_PORT,
            database: database.into(),
            username: username.into(),
            password: String::new(),
        }
    }

    /// Builder method: set port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder method: set password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Names of required fields that are blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("host", &self.host),
            ("database", &self.database),
            ("username", &self.username),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

impl fmt::Debug for NewConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewConnection")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Input to a validation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationRequest {
    /// Dataset name (CSV file name or connection name)
    #[serde(default)]
    pub dataset: String,
    /// Check document
    #[serde(default)]
    pub config: String,
    #[serde(default)]
    pub dataset_type: DatasetKind,
}

impl ValidationRequest {
    pub fn new(dataset: impl Into<String>, config: impl Into<String>, kind: DatasetKind) -> Self {
        Self {
            dataset: dataset.into(),
            config: config.into(),
            dataset_type: kind,
        }
    }
}

/// Outcome of a single check
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Passed,
    Warning,
    Failed,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Passed => "passed",
            CheckStatus::Warning => "warning",
            CheckStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single evaluated check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationCheck {
    /// Metric text, e.g. `missing_count(email)`
    pub name: String,
    /// The check as written in the document
    pub definition: String,
    /// Measured value rendered as text
    pub result: String,
    pub status: CheckStatus,
}

impl ValidationCheck {
    pub fn new(
        name: impl Into<String>,
        definition: impl Into<String>,
        result: impl Into<String>,
        status: CheckStatus,
    ) -> Self {
        Self {
            name: name.into(),
            definition: definition.into(),
            result: result.into(),
            status,
        }
    }
}

/// A row/column cell that violated a check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvalidRecord {
    /// 1-based data row
    pub row: usize,
    pub column: String,
    pub value: String,
    pub issue: String,
}

/// Check counts by status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ValidationSummary {
    pub total: usize,
    pub passed: usize,
    pub warnings: usize,
    pub failed: usize,
}

impl ValidationSummary {
    /// Derive the summary from a list of checks
    pub fn from_checks(checks: &[ValidationCheck]) -> Self {
        checks.iter().fold(Self::default(), |mut summary, check| {
            summary.total += 1;
            match check.status {
                CheckStatus::Passed => summary.passed += 1,
                CheckStatus::Warning => summary.warnings += 1,
                CheckStatus::Failed => summary.failed += 1,
            }
            summary
        })
    }

    pub fn count(&self, status: CheckStatus) -> usize {
        match status {
            CheckStatus::Passed => self.passed,
            CheckStatus::Warning => self.warnings,
            CheckStatus::Failed => self.failed,
        }
    }
}

/// The complete, immutable outcome of a validation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationResult {
    pub id: String,
    pub dataset: String,
    pub timestamp: DateTime<Utc>,
    pub summary: ValidationSummary,
    pub checks: Vec<ValidationCheck>,
    pub invalid_records: Vec<InvalidRecord>,
}

impl ValidationResult {
    /// Build a result for `dataset`, deriving id, timestamp and summary
    pub fn new(
        dataset: impl Into<String>,
        checks: Vec<ValidationCheck>,
        invalid_records: Vec<InvalidRecord>,
    ) -> Self {
        let dataset = dataset.into();
        Self {
            id: result_id(&dataset),
            summary: ValidationSummary::from_checks(&checks),
            dataset,
            timestamp: Utc::now(),
            checks,
            invalid_records,
        }
    }

    /// Checks with the given status, in document order
    pub fn checks_with_status(
        &self,
        status: CheckStatus,
    ) -> impl Iterator<Item = &ValidationCheck> + '_ {
        self.checks.iter().filter(move |c| c.status == status)
    }

    pub fn failed_checks(&self) -> Vec<&ValidationCheck> {
        self.checks_with_status(CheckStatus::Failed).collect()
    }

    pub fn warning_checks(&self) -> Vec<&ValidationCheck> {
        self.checks_with_status(CheckStatus::Warning).collect()
    }

    pub fn passed_checks(&self) -> Vec<&ValidationCheck> {
        self.checks_with_status(CheckStatus::Passed).collect()
    }

    /// `passed + warnings + failed == total == len(checks)` and the counts
    /// agree with the check statuses
    pub fn is_consistent(&self) -> bool {
        let s = &self.summary;
        s.total == self.checks.len()
            && s.passed + s.warnings + s.failed == s.total
            && *s == ValidationSummary::from_checks(&self.checks)
    }
}

/// Generate a result id: dataset name with dots dashed plus 8 hex chars
pub fn result_id(dataset: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", dataset.replace('.', "-"), &suffix[..8])
}

/// Acknowledgement body for deletes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ack {
    pub message: String,
}

impl Ack {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
