//! Validation Routes
//!
//! - POST /validation/run - Run checks against a dataset
//! - GET /validation/results - All results, oldest first
//! - GET /validation/results/:id - One result

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::model::{ValidationRequest, ValidationResult};

/// POST /validation/run
pub async fn run_validation(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ValidationRequest>, JsonRejection>,
) -> ApiResult<Json<ValidationResult>> {
    let Json(request) = payload?;
    let result = state.validation.run(request).await?;
    Ok(Json(result))
}

/// GET /validation/results
pub async fn list_results(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ValidationResult>>> {
    Ok(Json(state.results.list().await?))
}

/// GET /validation/results/:id
pub async fn get_result(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ValidationResult>> {
    find_result(&state, &id).await.map(Json)
}

/// Look up a result or fail with 404
pub(crate) async fn find_result(state: &AppState, id: &str) -> ApiResult<ValidationResult> {
    state
        .results
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Result {} not found", id)))
}
