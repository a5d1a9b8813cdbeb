//! Dataset Routes
//!
//! - GET /datasets - List uploaded datasets
//! - POST /datasets/upload - Upload a CSV file (multipart field `file`)
//! - DELETE /datasets/:filename - Delete a dataset

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::model::{Ack, Dataset};

/// GET /datasets
pub async fn list_datasets(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Dataset>>> {
    Ok(Json(state.datasets.list().await?))
}

/// POST /datasets/upload
///
/// Stores the `file` part under its own file name, replacing any existing
/// dataset of that name.
pub async fn upload_dataset(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Dataset>)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(|f| f.to_string())
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| ApiError::Validation("Uploaded file has no file name".to_string()))?;

        let bytes = field.bytes().await?;
        let dataset = state.datasets.save(&filename, bytes.to_vec()).await?;

        return Ok((StatusCode::CREATED, Json(dataset)));
    }

    Err(ApiError::Validation(
        "Missing multipart field 'file'".to_string(),
    ))
}

/// DELETE /datasets/:filename
pub async fn delete_dataset(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> ApiResult<Json<Ack>> {
    state.datasets.delete(&filename).await?;
    Ok(Json(Ack::new(format!("File {} deleted successfully", filename))))
}
