//! Currency error types.

use neutron_shared::types::Currency;
use thiserror::Error;

/// Errors raised while fetching rates or converting values.
#[derive(Debug, Error)]
pub enum CurrencyError {
    /// The rate table has no entry for a currency.
    #[error("No exchange rate for {0}")]
    MissingRate(Currency),

    /// A rate is zero or negative.
    #[error("Exchange rate for {0} must be positive")]
    NonPositiveRate(Currency),

    /// The provider could not be reached or answered with an error status.
    #[error("Exchange rate provider request failed: {0}")]
    Provider(#[from] reqwest::Error),

    /// The provider answered with an unexpected body.
    #[error("Malformed exchange rate response: {0}")]
    MalformedResponse(String),
}
