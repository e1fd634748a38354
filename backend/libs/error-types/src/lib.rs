//! Shared error taxonomy for the job portal services
//!
//! Every service answers failures with the same JSON body:
//!
//! ```json
//! { "error": "FORBIDDEN", "message": "Insufficient permissions" }
//! ```
//!
//! Messages never carry internal details. `Internal` and `Upstream` causes are
//! logged server-side and replaced by a generic message on the wire.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already exists")]
    EmailTaken,

    /// Resource kind only, never the looked-up key
    #[error("Resource not found: {resource}")]
    NotFound { resource: &'static str },

    /// Bad signature, expiry and malformed tokens all collapse into this one case
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Wire format of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

impl ServiceError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn internal<E: std::fmt::Display>(error: E) -> Self {
        Self::Internal(error.to_string())
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Conflict(_) => "CONFLICT",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Upstream(_) => "BAD_GATEWAY",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to return to the client
    pub fn client_message(&self) -> String {
        match self {
            // Don't expose internal details to clients
            Self::Upstream(_) => "Upstream service unavailable".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Log error with appropriate level and context
    pub fn log(&self) {
        match self {
            Self::NotFound { .. } | Self::Validation(_) | Self::Conflict(_) | Self::EmailTaken => {
                tracing::debug!(error = %self, "Client error");
            }
            Self::InvalidCredentials
            | Self::InvalidToken
            | Self::Unauthorized
            | Self::Forbidden => {
                tracing::warn!(error = %self, "Authorization failure");
            }
            Self::Upstream(_) => {
                tracing::warn!(error = %self, "Dependency issue");
            }
            Self::Internal(_) => {
                tracing::error!(error = %self, "Server error");
            }
        }
    }

    pub fn to_response_body(&self) -> ErrorResponse {
        ErrorResponse::new(self.code(), self.client_message())
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::InvalidToken | Self::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            Self::EmailTaken | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.log();
        HttpResponse::build(self.status_code()).json(self.to_response_body())
    }
}
