//! Currencies and 2-decimal money rounding.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount is a `rust_decimal::Decimal` rounded to cents before it is
//! stored, and again when it is displayed.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places every stored amount carries.
pub const MONEY_SCALE: u32 = 2;

/// Rounds an amount to 2 decimal places, half away from zero.
///
/// `1.005` becomes `1.01`. Applying it twice yields the same value.
#[must_use]
pub fn round_value(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts an amount to integer cents after rounding it.
///
/// Returns `None` if the amount does not fit in an `i64`.
#[must_use]
pub fn to_cents(value: Decimal) -> Option<i64> {
    let mut rounded = round_value(value);
    rounded.rescale(MONEY_SCALE);
    i64::try_from(rounded.mantissa()).ok()
}

/// Builds an amount from integer cents.
#[must_use]
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, MONEY_SCALE)
}

/// Currencies a user can keep their ledger in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    /// Euro
    Euro,
    /// US Dollar, the exchange rate base.
    #[default]
    Dollar,
    /// British Pound
    PoundSterling,
    /// Japanese Yen
    JapaneseYen,
    /// Chinese Yuan Renminbi
    ChineseYuan,
}

impl Currency {
    /// Every supported currency.
    pub const ALL: [Self; 5] = [
        Self::Euro,
        Self::Dollar,
        Self::PoundSterling,
        Self::JapaneseYen,
        Self::ChineseYuan,
    ];

    /// ISO 4217 code used to index the rate table.
    #[must_use]
    pub const fn iso_code(self) -> &'static str {
        match self {
            Self::Euro => "EUR",
            Self::Dollar => "USD",
            Self::PoundSterling => "GBP",
            Self::JapaneseYen => "JPY",
            Self::ChineseYuan => "CNY",
        }
    }

    /// Stable enum name, as stored in the database.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Euro => "EURO",
            Self::Dollar => "DOLLAR",
            Self::PoundSterling => "POUND_STERLING",
            Self::JapaneseYen => "JAPANESE_YEN",
            Self::ChineseYuan => "CHINESE_YUAN",
        }
    }

    /// Display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Euro => "Euro",
            Self::Dollar => "US Dollar",
            Self::PoundSterling => "Pound Sterling",
            Self::JapaneseYen => "Japanese Yen",
            Self::ChineseYuan => "Chinese Yuan",
        }
    }

    /// Currency symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Euro => "€",
            Self::Dollar => "$",
            Self::PoundSterling => "£",
            Self::JapaneseYen | Self::ChineseYuan => "¥",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    /// Accepts either the enum name (`POUND_STERLING`) or the ISO code (`GBP`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name() == wanted || c.iso_code() == wanted)
            .ok_or_else(|| format!("Unknown currency: {s}"))
    }
}

#[cfg(test)]
#[path = "money_tests.rs"]
mod tests;
