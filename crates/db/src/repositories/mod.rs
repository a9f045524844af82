//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

mod convert;

pub mod label;
pub mod revenue;
pub mod user;

pub use label::LabelRepository;
pub use revenue::{LedgerValue, RevenueFilter, RevenueRepository, TicketFilter};
pub use user::{CreateUserInput, UserRepository};
