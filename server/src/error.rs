//! Error responses for the HTTP API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jobmesh_aggregator::AggregateError;
use jobmesh_db::DatabaseError;
use jobmesh_enrich::EnrichError;
use serde::Serialize;

/// Serializable API error.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// HTTP status, not serialized
    #[serde(skip)]
    pub status: StatusCode,
    /// Error code for client handling (e.g., "STORE_UNAVAILABLE")
    pub code: String,
    /// User-friendly error message
    pub message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<AggregateError> for ApiError {
    fn from(err: AggregateError) -> Self {
        match err {
            AggregateError::EmptyQuery => {
                Self::new(StatusCode::BAD_REQUEST, "EMPTY_QUERY", err.to_string())
            }
            AggregateError::StoreUnavailable(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                err.to_string(),
            ),
            AggregateError::Database(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                err.to_string(),
            ),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFoundWithMessage(_) => {
                Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
            }
            DatabaseError::Validation(_) => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_RECORD", err.to_string())
            }
            ref e if e.is_unavailable() => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                err.to_string(),
            ),
            _ => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                err.to_string(),
            ),
        }
    }
}

impl From<EnrichError> for ApiError {
    fn from(err: EnrichError) -> Self {
        match err {
            EnrichError::NotAnObject(_) => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_PAYLOAD", err.to_string())
            }
            EnrichError::Store(e) => e.into(),
        }
    }
}
