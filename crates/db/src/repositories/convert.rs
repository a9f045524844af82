//! Column encodings: money as integer cents, instants as epoch milliseconds.

use chrono::{DateTime, Utc};
use neutron_shared::types::{from_cents, to_cents};
use rust_decimal::Decimal;
use sea_orm::DbErr;

pub(crate) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(crate) fn from_millis(millis: i64) -> Result<DateTime<Utc>, DbErr> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| DbErr::Custom(format!("Stored instant out of range: {millis}")))
}

pub(crate) fn cents(value: Decimal) -> Result<i64, DbErr> {
    to_cents(value).ok_or_else(|| DbErr::Custom(format!("Value out of range: {value}")))
}

pub(crate) fn value(cents: i64) -> Decimal {
    from_cents(cents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_millis_preserve_instant() {
        let at = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
        assert_eq!(from_millis(to_millis(at)).unwrap(), at);
    }

    #[test]
    fn test_cents_round_before_storing() {
        assert_eq!(cents(dec!(1.005)).unwrap(), 101);
        assert_eq!(cents(dec!(25.5)).unwrap(), 2550);
        assert_eq!(value(2550), dec!(25.50));
        assert!(cents(Decimal::MAX).is_err());
    }
}
