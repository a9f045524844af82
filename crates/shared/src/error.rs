//! Application-wide error types.
//!
//! Failures a caller caused (bad input, missing or foreign records, conflicting
//! state) all surface as [`AppError::OperationFailed`] so the boundary never
//! tells them apart.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Message returned for every caller-side failure.
pub const OPERATION_FAILED_MESSAGE: &str = "The requested operation could not be completed";

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Validation failure, missing record, or conflicting state.
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// External service error.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::OperationFailed(_) => 400,
            Self::ExternalService(_) => 502,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::OperationFailed(_) => "OPERATION_FAILED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the message that is safe to show to API clients.
    ///
    /// Only `Unauthorized` carries its detail; everything else is replaced
    /// by a fixed message.
    #[must_use]
    pub fn public_message(&self) -> &str {
        match self {
            Self::Unauthorized(msg) => msg,
            Self::OperationFailed(_) => OPERATION_FAILED_MESSAGE,
            Self::ExternalService(_) => "Exchange rate provider unavailable",
            Self::Database(_) | Self::Internal(_) => "An internal error occurred",
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
