//! Core revenue ledger logic for Neutron.
//!
//! This crate contains pure business logic with ZERO web framework or database
//! dependencies. Domain types, validation rules and calculations live here.
//!
//! # Modules
//!
//! - `revenue` - General revenues, projects, initial revenues and tickets
//! - `label` - Shared `(text, color)` labels and the per-revenue cap
//! - `period` - Relative time windows for filtering and trend comparison
//! - `currency` - Rate table, refresh-gated cache, provider and conversion
//! - `wallet` - Period totals and trend percentage
//! - `clock` - Injectable time source

pub mod clock;
pub mod currency;
pub mod label;
pub mod period;
pub mod revenue;
pub mod wallet;

pub use clock::{Clock, ManualClock, SystemClock};
