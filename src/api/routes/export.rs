//! Export Routes
//!
//! Download a stored validation result.
//!
//! - GET /export/json/:id - Full result as JSON
//! - GET /export/csv/:id - Checks as CSV

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::routes::validation::find_result;
use crate::api::state::AppState;
use crate::export::{export_filename, render, ExportFormat};

/// GET /export/json/:id
pub async fn export_json(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    export(&state, &id, ExportFormat::Json).await
}

/// GET /export/csv/:id
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    export(&state, &id, ExportFormat::Csv).await
}

async fn export(state: &AppState, id: &str, format: ExportFormat) -> ApiResult<Response> {
    let result = find_result(state, id).await?;
    let body = render(&result, format)?;
    let filename = export_filename(&result, format, Utc::now().date_naive());

    tracing::debug!(result_id = %id, filename = %filename, "Exporting result");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(body),
    )
        .into_response())
}
