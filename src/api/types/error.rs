//! The single HTTP-facing error type.
//!
//! Every failure that escapes a handler is rendered once, centrally, as
//! `{"error": message, "name": name, "message": message}` with a status of at
//! least 400. More specific statuses set upstream are preserved; anything
//! without one becomes a 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::DomainError;

/// Wire shape of an error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub name: String,
    pub message: String,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub name: String,
    pub message: String,
}

impl ApiError {
    /// Create a new API error. Statuses below 400 are coerced to 500.
    pub fn new(status: StatusCode, name: impl Into<String>, message: impl Into<String>) -> Self {
        let status = if status.as_u16() < 400 {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            status
        };
        Self {
            status,
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BadRequestError", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UnauthorizedError", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NotFoundError", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "InternalServerError",
            message,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("SERVER ERROR: {}: {}", self.name, self.message);

        let body = ErrorBody {
            error: self.message.clone(),
            name: self.name,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();
        match err {
            DomainError::Configuration { .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "ConfigurationError", message)
            }
            DomainError::Discovery { .. } => {
                Self::new(StatusCode::BAD_GATEWAY, "DiscoveryError", message)
            }
            DomainError::TokenVerification { .. } => {
                Self::new(StatusCode::UNAUTHORIZED, "TokenVerificationError", message)
            }
            DomainError::Unauthorized { .. } => {
                Self::new(StatusCode::UNAUTHORIZED, "UnauthorizedError", message)
            }
            DomainError::Internal { .. } => Self::internal(message),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl std::error::Error for ApiError {}
