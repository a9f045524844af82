//! Ledger services: transactional revenue operations, background currency
//! conversion and wallet aggregation.

mod currency;
mod error;
mod locks;
mod revenue;
mod wallet;

pub use currency::{ConversionHandle, ConversionStatus, CurrencyService};
pub use error::ServiceError;
pub use locks::{KeyGuard, KeyedLocks};
pub use revenue::{RevenueQuery, RevenueService};
pub use wallet::WalletService;
