//! Health Routes
//!
//! - GET / - Service banner
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (ready to serve traffic)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{HealthResponse, ROOT_MESSAGE};
use crate::api::state::AppState;
use crate::model::Ack;

/// GET /
pub async fn root() -> Json<Ack> {
    Json(Ack::new(ROOT_MESSAGE))
}

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 when both the upload directory and the result history answer.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if check_uploads(&state).await && check_history(&state).await.is_some() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let uploads_ok = check_uploads(&state).await;
    let stored_results = check_history(&state).await;
    let history_ok = stored_results.is_some();

    let component = |ok: bool| (if ok { "ok" } else { "error" }).to_string();
    let overall_status = if uploads_ok && history_ok {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: overall_status.to_string(),
        uploads: component(uploads_ok),
        history: component(history_ok),
        results_backend: state.results.name().to_string(),
        results: stored_results.unwrap_or(0),
        connections: state.connections.len().await,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn check_uploads(state: &AppState) -> bool {
    tokio::fs::metadata(state.datasets.dir())
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// Stored result count, or `None` when the history does not answer
async fn check_history(state: &AppState) -> Option<usize> {
    match state.results.count().await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(error = %e, "Result history health check failed");
            None
        }
    }
}
