//! Data Transfer Objects
//!
//! Request and response types used only by the HTTP layer. Domain types
//! (`Dataset`, `Connection`, `ValidationResult`, ...) live in `model` and
//! are serialized directly.

use serde::{Deserialize, Serialize};

/// Message served at `GET /`
pub const ROOT_MESSAGE: &str = "Data Validation API is running";

/// Full health status
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,
    /// Upload directory status: "ok" or "error"
    pub uploads: String,
    /// Result history status: "ok" or "error"
    pub history: String,
    /// Result history backend name
    pub results_backend: String,
    /// Stored validation results
    pub results: usize,
    pub connections: usize,
    pub uptime_seconds: u64,
    pub version: String,
}
