//! HTTP error types for the Quire server.
//!
//! Maps domain errors from `quire-core` into appropriate HTTP responses.
//! Every error variant produces a JSON body with a machine-readable `error`
//! field and a human-readable `message`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use quire_core::error::{CredentialError, LifecycleError, PageError, RouteError};

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Login failed.
    Unauthorized(String),
    /// Requested resource not found.
    NotFound(String),
    /// The path exists but not for this HTTP method.
    MethodNotAllowed(String),
    /// Client sent invalid input.
    BadRequest(String),
    /// A conflict (e.g., username taken).
    Conflict(String),
    /// Internal server error. The message is the underlying cause.
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            Self::MethodNotAllowed(msg) => {
                (StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed", msg)
            }
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };

        let body = ErrorBody {
            error: error_type,
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<RouteError> for AppError {
    fn from(err: RouteError) -> Self {
        Self::NotFound(err.to_string())
    }
}

impl From<PageError> for AppError {
    fn from(err: PageError) -> Self {
        match err {
            PageError::NotFound { .. } => Self::NotFound(err.to_string()),
            PageError::Storage(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::InvalidTitle { .. } | LifecycleError::UnknownIntent { .. } => {
                Self::BadRequest(err.to_string())
            }
            LifecycleError::AlreadyExists { .. } | LifecycleError::Missing { .. } => {
                Self::Conflict(err.to_string())
            }
            LifecycleError::Page(inner) => inner.into(),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::EmptyField { .. } | CredentialError::PasswordMismatch => {
                Self::BadRequest(err.to_string())
            }
            CredentialError::UsernameTaken { .. } => Self::Conflict(err.to_string()),
            CredentialError::Unavailable { .. } => Self::Internal(err.to_string()),
        }
    }
}
