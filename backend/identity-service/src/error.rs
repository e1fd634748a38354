use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use error_types::ServiceError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IdentityError>;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IdentityError {
    /// Map onto the shared taxonomy used for the wire format
    pub fn to_service_error(&self) -> ServiceError {
        match self {
            IdentityError::InvalidCredentials => ServiceError::InvalidCredentials,
            IdentityError::UserNotFound => ServiceError::not_found("user"),
            IdentityError::EmailAlreadyExists => ServiceError::EmailTaken,
            IdentityError::Validation(msg) => ServiceError::Validation(msg.clone()),
            IdentityError::Database(msg) | IdentityError::Internal(msg) => {
                // Don't leak internal details in production
                ServiceError::Internal(msg.clone())
            }
        }
    }
}

impl ResponseError for IdentityError {
    fn status_code(&self) -> StatusCode {
        self.to_service_error().status_code()
    }

    fn error_response(&self) -> HttpResponse {
        self.to_service_error().error_response()
    }
}

// Conversions from external error types
impl From<sqlx::Error> for IdentityError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                IdentityError::EmailAlreadyExists
            }
            _ => {
                tracing::error!("Database error: {}", err);
                IdentityError::Database(err.to_string())
            }
        }
    }
}

impl From<crypto_core::TokenError> for IdentityError {
    fn from(err: crypto_core::TokenError) -> Self {
        tracing::error!("Token issuance failed: {}", err);
        IdentityError::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for IdentityError {
    fn from(err: validator::ValidationErrors) -> Self {
        IdentityError::Validation(err.to_string())
    }
}
