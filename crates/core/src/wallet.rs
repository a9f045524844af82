//! Wallet totals and period-over-period trend.

use neutron_shared::types::round_value;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trend reported when the previous period earned nothing.
pub const NO_HISTORY_TREND: Decimal = Decimal::ONE_HUNDRED;

/// Earnings for the selected period and their change against the period before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletStatus {
    /// Sum of the current period's revenue values.
    pub total_earnings: Decimal,
    /// Sum of the previous period's revenue values.
    pub previous_earnings: Decimal,
    /// Percentage change, 2 decimals.
    pub trend: Decimal,
}

impl WalletStatus {
    /// Builds a status from the two period totals.
    #[must_use]
    pub fn from_totals(total_earnings: Decimal, previous_earnings: Decimal) -> Self {
        let total_earnings = round_value(total_earnings);
        let previous_earnings = round_value(previous_earnings);
        Self {
            total_earnings,
            previous_earnings,
            trend: compute_trend(total_earnings, previous_earnings),
        }
    }
}

/// `100` if `previous` is zero, otherwise `(current − previous) / previous × 100`.
#[must_use]
pub fn compute_trend(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return NO_HISTORY_TREND;
    }
    round_value((current - previous) / previous * Decimal::ONE_HUNDRED)
}
