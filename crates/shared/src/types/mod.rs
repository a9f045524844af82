//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{Currency, from_cents, round_value, to_cents};
pub use pagination::{PageRequest, PageResponse};
