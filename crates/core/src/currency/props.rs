//! Property-based tests for currency conversion.

use neutron_shared::types::{Currency, round_value};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::conversion::convert_value;
use super::rates::RateTable;

/// Strategy to generate stored amounts (0.00 to 1,000,000.00).
fn stored_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate rates between 0.5 and 200 units per USD.
fn usd_rate() -> impl Strategy<Value = Decimal> {
    (5_000i64..2_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn non_usd() -> impl Strategy<Value = Currency> {
    prop::sample::select(vec![
        Currency::Euro,
        Currency::PoundSterling,
        Currency::JapaneseYen,
        Currency::ChineseYuan,
    ])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_usd_round_trip_within_a_cent(value in stored_amount(), rate in usd_rate(), currency in non_usd()) {
        let rates = RateTable::from_pairs([(currency, rate)]);
        let there = convert_value(value, Currency::Dollar, currency, &rates).unwrap();
        let back = convert_value(there, currency, Currency::Dollar, &rates).unwrap();
        prop_assert!((back - value).abs() <= Decimal::new(1, 2), "{} -> {} -> {}", value, there, back);
    }

    #[test]
    fn prop_result_is_stored_precision(value in stored_amount(), a in usd_rate(), b in usd_rate()) {
        let rates = RateTable::from_pairs([(Currency::Euro, a), (Currency::JapaneseYen, b)]);
        let converted = convert_value(value, Currency::Euro, Currency::JapaneseYen, &rates).unwrap();
        prop_assert_eq!(round_value(converted), converted);
        prop_assert!(converted >= Decimal::ZERO);
    }
}
