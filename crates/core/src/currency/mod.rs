//! Multi-currency handling: USD-based rate table, refresh-gated cache,
//! remote provider and value conversion.

pub mod conversion;
pub mod error;
pub mod provider;
pub mod rates;

#[cfg(test)]
mod props;

pub use conversion::convert_value;
pub use error::CurrencyError;
pub use provider::{HttpRateProvider, HttpRateProviderBuilder, RateProvider};
pub use rates::{RateCache, RateTable};
