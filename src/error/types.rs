//! Data and API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors produced by the in-memory store and the DynamoDB data layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("Unable to find deck with id [{0}]")]
    DeckNotFound(String),

    #[error("Unable to find card with id [{0}]")]
    CardNotFound(String),

    /// An entity that must carry a caller-assigned id arrived without one.
    #[error("{entity} requires an id")]
    MissingId { entity: &'static str },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("DynamoDB error: {0}")]
    DynamoDb(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl DataError {
    /// Whether this error means the requested deck or card does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::DeckNotFound(_) | DataError::CardNotFound(_))
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::DeckNotFound(_) | DataError::CardNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            DataError::MissingId { .. } | DataError::InvalidInput(_) => {
                ApiError::InvalidRequest(err.to_string())
            }
            DataError::DynamoDb(msg) => ApiError::StorageError(msg),
            DataError::Parse(_) => ApiError::Internal(anyhow::Error::new(err)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found_error", msg),
            ApiError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request_error", msg)
            }
            ApiError::StorageError(msg) => (StatusCode::BAD_GATEWAY, "storage_error", msg),
            ApiError::Internal(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "api_error",
                err.to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            type_: "error".to_string(),
            error: ErrorDetail {
                type_: error_type.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    #[serde(rename = "type")]
    type_: String,
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    type_: String,
    message: String,
}
