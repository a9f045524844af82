//! Revenue error types.

use neutron_shared::types::RevenueId;
use thiserror::Error;

/// Revenue-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RevenueError {
    /// Title is blank or longer than the allowed length.
    #[error("Title must be between 1 and {max} characters")]
    InvalidTitle {
        /// Maximum allowed length.
        max: usize,
    },

    /// Value is negative.
    #[error("Value cannot be negative")]
    NegativeValue,

    /// Value cannot be represented as stored cents.
    #[error("Value is out of range")]
    ValueOutOfRange,

    /// Description is longer than the allowed length.
    #[error("Description must be at most {max} characters")]
    InvalidDescription {
        /// Maximum allowed length.
        max: usize,
    },

    /// A label failed validation.
    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    /// Revenue does not exist or belongs to someone else.
    #[error("Revenue not found: {0}")]
    NotFound(RevenueId),

    /// Title already used by another revenue of the same kind.
    #[error("Title already in use: {0}")]
    DuplicateTitle(String),

    /// Ticket has already been closed.
    #[error("Ticket already closed: {0}")]
    TicketAlreadyClosed(RevenueId),
}

impl RevenueError {
    /// True for failures caused by malformed input rather than stored state.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidTitle { .. }
                | Self::NegativeValue
                | Self::ValueOutOfRange
                | Self::InvalidDescription { .. }
                | Self::InvalidLabel(_)
        )
    }
}
