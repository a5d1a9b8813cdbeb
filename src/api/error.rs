//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    extract::rejection::JsonRejection,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::connections::ConnectionError;
use crate::datasets::DatasetError;
use crate::export::ExportError;
use crate::history::HistoryError;
use crate::validation::ValidationError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("{0}")]
    Validation(String),

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Resource already exists
    #[error("{0}")]
    Conflict(String),

    /// Upload exceeds the body limit
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Feature not available in this server
    #[error("{0}")]
    NotImplemented(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            ApiError::NotImplemented(_) => (StatusCode::NOT_IMPLEMENTED, "NOT_IMPLEMENTED"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::warn!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DatasetError> for ApiError {
    fn from(err: DatasetError) -> Self {
        match err {
            DatasetError::InvalidName(_) | DatasetError::Csv { .. } => {
                ApiError::Validation(err.to_string())
            }
            DatasetError::NotFound(_) => ApiError::NotFound(err.to_string()),
            DatasetError::Io(e) => ApiError::Io(e),
            DatasetError::Task(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ConnectionError> for ApiError {
    fn from(err: ConnectionError) -> Self {
        match err {
            ConnectionError::MissingFields(_) => ApiError::Validation(err.to_string()),
            ConnectionError::Duplicate(_) => ApiError::Conflict(err.to_string()),
            ConnectionError::NotFound(_) => ApiError::NotFound(err.to_string()),
        }
    }
}

impl From<HistoryError> for ApiError {
    fn from(err: HistoryError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingFields(_) | ValidationError::Document(_) => {
                ApiError::Validation(err.to_string())
            }
            ValidationError::Dataset(e) => e.into(),
            ValidationError::ConnectionNotFound(_) => ApiError::NotFound(err.to_string()),
            ValidationError::Unsupported(_) => ApiError::NotImplemented(err.to_string()),
            ValidationError::History(e) => e.into(),
            ValidationError::Task(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::Validation(err.body_text())
        }
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::from(ConnectionError::MissingFields(vec!["name"])),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(ConnectionError::Duplicate("prod".into())),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::from(DatasetError::NotFound("a.csv".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(ValidationError::Unsupported("prod".into())),
                StatusCode::NOT_IMPLEMENTED,
            ),
            (
                ApiError::from(ValidationError::Dataset(DatasetError::InvalidName("x".into()))),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status_and_code().0, status, "{}", err);
        }
    }

    #[test]
    fn test_message_is_plain() {
        let err = ApiError::from(ConnectionError::MissingFields(vec!["name", "host"]));
        assert_eq!(err.to_string(), "Missing required fields: name, host");
    }
}
