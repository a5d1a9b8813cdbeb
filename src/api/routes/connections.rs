//! Connection Routes
//!
//! - GET /connections - List connections
//! - POST /connections - Register a connection
//! - DELETE /connections/:id - Remove a connection

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::model::{Ack, Connection, NewConnection};

/// GET /connections
pub async fn list_connections(State(state): State<Arc<AppState>>) -> Json<Vec<Connection>> {
    Json(state.connections.list().await)
}

/// POST /connections
///
/// Only presence of the required fields is checked; the database is not
/// contacted.
pub async fn create_connection(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewConnection>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Connection>)> {
    let Json(form) = payload?;
    let connection = state.connections.create(form).await?;
    Ok((StatusCode::CREATED, Json(connection)))
}

/// DELETE /connections/:id
pub async fn delete_connection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Ack>> {
    let id: u32 = id
        .parse()
        .map_err(|_| ApiError::Validation(format!("Invalid connection id '{}'", id)))?;

    state.connections.delete(id).await?;
    Ok(Json(Ack::new(format!("Connection {} deleted successfully", id))))
}
