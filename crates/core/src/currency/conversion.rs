//! Currency conversion through USD.
//!
//! Rates are quoted as units of a currency per 1 USD. Results are rounded
//! half away from zero to 2 decimals, the same rule used for storage.

use neutron_shared::types::{Currency, round_value};
use rust_decimal::Decimal;

use super::error::CurrencyError;
use super::rates::RateTable;

/// Converts `value` from `from` to `to` using USD-based `rates`.
///
/// - `from == to` only rounds.
/// - `from == USD`: `value × rate[to]`.
/// - otherwise: `usd = value / rate[from]`, then `usd` or `usd × rate[to]`.
pub fn convert_value(
    value: Decimal,
    from: Currency,
    to: Currency,
    rates: &RateTable,
) -> Result<Decimal, CurrencyError> {
    if from == to {
        return Ok(round_value(value));
    }

    let converted = if from == Currency::Dollar {
        value * rates.rate(to)?
    } else {
        let usd = value / rates.rate(from)?;
        if to == Currency::Dollar {
            usd
        } else {
            usd * rates.rate(to)?
        }
    };

    Ok(round_value(converted))
}
