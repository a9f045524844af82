//! Service-level errors and their mapping onto the application boundary.

use neutron_core::currency::CurrencyError;
use neutron_core::period::PeriodError;
use neutron_core::revenue::RevenueError;
use neutron_shared::AppError;
use neutron_shared::types::UserId;
use sea_orm::DbErr;
use thiserror::Error;

/// Errors returned by the ledger services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid input, missing revenue, or conflicting revenue state.
    #[error(transparent)]
    Revenue(#[from] RevenueError),

    /// Invalid period selection.
    #[error(transparent)]
    Period(#[from] PeriodError),

    /// The user does not exist.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// Exchange rates could not be obtained or applied.
    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Revenue(_) | ServiceError::Period(_) | ServiceError::UserNotFound(_) => {
                Self::OperationFailed(err.to_string())
            }
            ServiceError::Currency(e) => Self::ExternalService(e.to_string()),
            ServiceError::Database(e) => Self::Database(e.to_string()),
        }
    }
}
