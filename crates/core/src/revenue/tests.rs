//! Revenue model tests.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use neutron_shared::types::{RevenueId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::label::LabelDraft;

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + TimeDelta::days(n)
}

fn project(owner: UserId, initial: Decimal) -> ProjectRevenue {
    let id = RevenueId::new();
    ProjectRevenue {
        id,
        owner,
        title: "Trip".to_string(),
        revenue_date: day(0),
        initial_revenue: InitialRevenue {
            id: RevenueId::new(),
            owner,
            project_id: id,
            value: initial,
            revenue_date: day(0),
        },
        tickets: Vec::new(),
    }
}

fn ticket(project: &ProjectRevenue, title: &str, value: Decimal, opened: DateTime<Utc>) -> TicketRevenue {
    TicketRevenue {
        id: RevenueId::new(),
        owner: project.owner,
        project_id: project.id,
        title: title.to_string(),
        value,
        revenue_date: opened,
        description: None,
        closing_date: None,
    }
}

// ============================================================================
// Project value
// ============================================================================

#[test]
fn test_trip_scenario() {
    let mut trip = project(UserId::new(), dec!(100.00));
    assert_eq!(trip.value(), dec!(100.00));

    let fuel = ticket(&trip, "Fuel", dec!(25.50), day(1));
    let fuel_id = fuel.id;
    trip.tickets.push(fuel);
    assert_eq!(trip.value(), dec!(125.50));

    let stored = trip.tickets.iter_mut().find(|t| t.id == fuel_id).unwrap();
    stored.close(day(2)).unwrap();
    assert!(stored.is_closed());
    assert_eq!(stored.duration(), Some(TimeDelta::days(1)));
    assert_eq!(trip.value(), dec!(125.50));

    trip.tickets.retain(|t| t.id != fuel_id);
    assert_eq!(trip.value(), dec!(100.00));
}

#[test]
fn test_has_ticket_is_case_sensitive() {
    let mut trip = project(UserId::new(), dec!(0));
    let hotel = ticket(&trip, "Hotel", dec!(80), day(1));
    trip.tickets.push(hotel);

    assert!(trip.has_ticket("Hotel"));
    assert!(!trip.has_ticket("hotel"));
    assert!(!trip.has_ticket("Hotel "));
}

#[test]
fn test_balance_counts_closed_tickets_in_window() {
    let mut trip = project(UserId::new(), dec!(100));
    let mut old = ticket(&trip, "Old", dec!(5), day(1));
    old.close(day(2)).unwrap();
    let mut recent = ticket(&trip, "Recent", dec!(7), day(10));
    recent.close(day(11)).unwrap();
    let pending = ticket(&trip, "Pending", dec!(1000), day(10));
    trip.tickets = vec![old, recent, pending];

    assert_eq!(trip.balance(None, true), dec!(112));
    assert_eq!(trip.balance(Some(day(5)), true), dec!(107));
    assert_eq!(trip.balance(None, false), dec!(100));
}

// ============================================================================
// Ticket lifecycle
// ============================================================================

#[test]
fn test_close_is_rejected_twice() {
    let trip = project(UserId::new(), dec!(0));
    let mut t = ticket(&trip, "Once", dec!(1), day(1));

    assert_eq!(t.status(), TicketStatus::Pending);
    assert_eq!(t.closing_timestamp(), PENDING_CLOSING_DATE);
    assert_eq!(t.duration(), None);

    let closed_at = t.close(day(3)).unwrap();
    assert_eq!(t.status(), TicketStatus::Closed(closed_at));
    assert_eq!(t.closing_timestamp(), day(3).timestamp_millis());

    assert_eq!(t.close(day(4)), Err(RevenueError::TicketAlreadyClosed(t.id)));
    assert_eq!(t.closing_date, Some(day(3)));
}

#[test]
fn test_close_never_precedes_opening() {
    let trip = project(UserId::new(), dec!(0));
    let mut future = ticket(&trip, "Future", dec!(1), day(30));
    let at = future.close(day(1)).unwrap();
    assert_eq!(at, day(30));
    assert_eq!(future.duration(), Some(TimeDelta::zero()));
}

// ============================================================================
// Drafts
// ============================================================================

#[test]
fn test_revenue_draft_normalizes() {
    let draft = RevenueDraft {
        title: "Consulting".to_string(),
        value: dec!(1.005),
        revenue_date: day(0),
        description: Some("March".to_string()),
        labels: (0..7)
            .map(|i| LabelDraft::new(format!("l{i}"), "#112233"))
            .collect(),
    }
    .normalize()
    .unwrap();

    assert_eq!(draft.value, dec!(1.01));
    assert_eq!(draft.labels.len(), crate::label::MAX_REVENUE_LABELS);
}

#[test]
fn test_drafts_reject_invalid_input() {
    let long_title = "x".repeat(MAX_TITLE_LENGTH + 1);
    assert!(
        ProjectDraft {
            title: long_title,
            value: dec!(1),
            revenue_date: day(0),
        }
        .normalize()
        .is_err()
    );
    assert_eq!(
        TicketDraft {
            title: "Refund".to_string(),
            value: dec!(-3),
            revenue_date: day(0),
            description: None,
        }
        .normalize(),
        Err(RevenueError::NegativeValue)
    );
}

#[test]
fn test_merged_ordering_newest_first() {
    let owner = UserId::new();
    let trip = project(owner, dec!(1));
    let general = GeneralRevenue {
        id: RevenueId::new(),
        owner,
        title: "Salary".to_string(),
        value: dec!(10),
        revenue_date: day(5),
        description: None,
        labels: Vec::new(),
    };
    let mut all = vec![Revenue::Project(trip), Revenue::General(general)];
    all.sort_by(Revenue::newest_first);

    assert_eq!(all[0].kind(), RevenueKind::General);
    assert_eq!(all[1].kind(), RevenueKind::Project);
}

// ============================================================================
// Properties
// ============================================================================

fn cents() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|c| Decimal::new(c, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_project_value_is_initial_plus_tickets(
        initial in cents(),
        values in prop::collection::vec(cents(), 0..20),
        closed_mask in prop::collection::vec(any::<bool>(), 20),
        removed in 0usize..20,
    ) {
        let mut trip = project(UserId::new(), initial);
        for (i, value) in values.iter().enumerate() {
            let mut t = ticket(&trip, &format!("t{i}"), *value, day(1));
            if closed_mask[i] {
                t.close(day(2)).unwrap();
            }
            trip.tickets.push(t);
        }
        let expected: Decimal = initial + values.iter().copied().sum::<Decimal>();
        prop_assert_eq!(trip.value(), expected);

        if removed < trip.tickets.len() {
            let gone = trip.tickets.remove(removed);
            prop_assert_eq!(trip.value(), expected - gone.value);
        }
    }
}
