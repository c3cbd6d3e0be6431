//! # REST API Errors
//!
//! Error types for the REST API module.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::driver::DriverError;
use crate::query::QueryError;

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

/// REST API errors
#[derive(Debug, Clone, Error)]
pub enum RestError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Write or delete with no WHERE condition
    #[error("{0}")]
    MissingConstraint(String),

    /// Invalid JSON or wrong top-level shape
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Identity missing, invalid or empty on an owner-scoped table
    #[error("Forbidden: {0}")]
    Forbidden(#[from] AuthError),

    /// Write on a non-writable table
    #[error("Table {0} is read-only")]
    ReadOnly(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Column set unknown, so writes cannot be validated
    #[error("Schema unavailable for table {0}")]
    SchemaUnavailable(String),

    /// Statement execution failed
    #[error("Backend error: {0}")]
    Backend(String),

    /// HTTP method with no table operation
    #[error("Method {0} not implemented")]
    UnsupportedMethod(String),
}

impl RestError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::MissingConstraint(_) => StatusCode::BAD_REQUEST,
            RestError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            RestError::Forbidden(_) => StatusCode::FORBIDDEN,
            RestError::ReadOnly(_) => StatusCode::METHOD_NOT_ALLOWED,
            RestError::SchemaUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::UnsupportedMethod(_) => StatusCode::NOT_IMPLEMENTED,
        }
    }
}

impl From<QueryError> for RestError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::MissingConstraint { .. } => RestError::MissingConstraint(err.to_string()),
            QueryError::NoWritableColumns(_) | QueryError::NotAnObject(_) => {
                RestError::MalformedPayload(err.to_string())
            }
            QueryError::MissingIdentity(_) => {
                RestError::Forbidden(AuthError::AuthenticationRequired)
            }
        }
    }
}

impl From<DriverError> for RestError {
    fn from(err: DriverError) -> Self {
        RestError::Backend(err.to_string())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<RestError> for ErrorResponse {
    fn from(err: RestError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}
