//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and its mapping
//! onto the uniform `{"error": "..."}` response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::config::ConfigError;
use classflow_core::ports::{GenerationError, PortError};
use classflow_core::workflow::WorkflowError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A request that fails domain validation (bad payload, malformed
    /// generated content, missing precondition data).
    #[error("{0}")]
    Validation(String),

    /// The resource does not exist, or is not owned by the caller. The two
    /// cases are deliberately indistinguishable.
    #[error("{0}")]
    NotFound(String),

    /// The operation conflicts with already-persisted state (quiz already
    /// published, duplicate quiz kind, concurrent guide version).
    #[error("{0}")]
    Conflict(String),

    /// No valid principal on the request.
    #[error("Unauthorized")]
    Unauthorized,

    /// The principal is authenticated but lacks a teacher profile.
    #[error("{0}")]
    Forbidden(String),

    /// A workflow-ordering or guard violation.
    #[error("{0}")]
    Workflow(#[from] WorkflowError),

    /// A non-retryable failure from the generative text service (retryable
    /// kinds are exhausted inside the client before surfacing here).
    #[error("Generation service error: {0}")]
    Generation(#[from] GenerationError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Ownership failures and storage-level conflicts keep their shape on the way
/// up so the envelope can map them to the right status.
impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(msg) => ApiError::NotFound(msg),
            PortError::Conflict(msg) => ApiError::Conflict(msg),
            PortError::Unauthorized => ApiError::Unauthorized,
            other => ApiError::Port(other),
        }
    }
}

/// The uniform error envelope returned by every endpoint.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Workflow(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("internal error: {:?}", self);
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
