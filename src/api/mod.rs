//! dqdash REST API
//!
//! HTTP API layer, built with Axum.
//!
//! # Endpoints
//!
//! ## Datasets
//! - `GET /datasets` - List uploaded CSV datasets
//! - `POST /datasets/upload` - Upload a CSV file (multipart)
//! - `DELETE /datasets/:filename` - Delete a dataset
//!
//! ## Connections
//! - `GET /connections` - List database connections
//! - `POST /connections` - Register a connection
//! - `DELETE /connections/:id` - Remove a connection
//!
//! ## Validation
//! - `POST /validation/run` - Run a check document against a dataset
//! - `GET /validation/results` - Result history
//! - `GET /validation/results/:id` - One result
//!
//! ## Export
//! - `GET /export/json/:id` - Result as a JSON attachment
//! - `GET /export/csv/:id` - Checks as a CSV attachment
//!
//! ## Health
//! - `GET /` - Service banner
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,no_run
//! use dqdash::api::{serve, AppState};
//! use dqdash::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let state = AppState::from_config(&config)?;
//!     let api_config = state.config.as_ref().clone();
//!     serve(state, &api_config).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorBody, ErrorResponse};
pub use state::{ApiConfig, AppState, StateError};

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let max_body_size = state.config.max_body_size;

    let dataset_routes = Router::new()
        .route("/", get(routes::datasets::list_datasets))
        .route("/upload", post(routes::datasets::upload_dataset))
        .route("/:filename", delete(routes::datasets::delete_dataset))
        .layer(DefaultBodyLimit::max(max_body_size));

    let connection_routes = Router::new()
        .route(
            "/",
            get(routes::connections::list_connections).post(routes::connections::create_connection),
        )
        .route("/:id", delete(routes::connections::delete_connection));

    let validation_routes = Router::new()
        .route("/run", post(routes::validation::run_validation))
        .route("/results", get(routes::validation::list_results))
        .route("/results/:id", get(routes::validation::get_result));

    let export_routes = Router::new()
        .route("/json/:id", get(routes::export::export_json))
        .route("/csv/:id", get(routes::export::export_csv));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::health::root))
        .nest("/datasets", dataset_routes)
        .nest("/connections", connection_routes)
        .nest("/validation", validation_routes)
        .nest("/export", export_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("dqdash API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("dqdash API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
