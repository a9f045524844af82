use super::*;
use std::str::FromStr;

#[test]
fn test_typed_id_from_uuid() {
    let uuid = Uuid::new_v4();
    let id = RevenueId::from_uuid(uuid);
    assert_eq!(id.into_inner(), uuid);
    assert_eq!(RevenueId::from(uuid), id);
}

#[test]
fn test_typed_id_display_round_trip() {
    let id = UserId::new();
    assert_eq!(UserId::from_str(&id.to_string()).unwrap(), id);
}

#[test]
fn test_typed_id_from_str_error() {
    assert!(LabelId::from_str("invalid").is_err());
}

#[test]
fn test_v7_ids_are_time_ordered() {
    let first = RevenueId::new();
    let second = RevenueId::new();
    assert!(first < second);
}
