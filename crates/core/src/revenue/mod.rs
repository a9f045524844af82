//! Revenue model: general revenues, projects, initial revenues and tickets.
//!
//! # Invariants
//!
//! - Every stored value carries at most 2 decimals
//! - A project's value is always `initial + Σ tickets`, never stored
//! - A ticket's closing date is set once and is never before its opening date

mod error;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use error::RevenueError;
pub use types::{
    GeneralRevenue, InitialRevenue, PENDING_CLOSING_DATE, ProjectDraft, ProjectRevenue, Revenue,
    RevenueDraft, RevenueKind, TicketDraft, TicketRevenue, TicketStatus,
};
pub use validation::{
    MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH, validate_description, validate_title,
    validate_value,
};
