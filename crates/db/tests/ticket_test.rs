//! Integration tests for projects and their tickets.

mod common;

use chrono::TimeDelta;
use common::{clock_at, create_user, day, project, setup, ticket};
use neutron_core::period::RevenuePeriod;
use neutron_core::revenue::{Revenue, RevenueError, TicketStatus};
use neutron_db::repositories::TicketFilter;
use neutron_db::{RevenueService, ServiceError};
use neutron_shared::types::{Currency, PageRequest};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_trip_project_lifecycle() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let clock = clock_at(day(0));
    let service = RevenueService::new(db.clone(), clock.clone());

    let trip = service
        .add_project(owner, project("Trip", dec!(100.00), day(0)))
        .await
        .unwrap();
    assert_eq!(trip.value(), dec!(100.00));

    clock.set(day(1));
    let fuel = service
        .add_ticket(owner, trip.id, ticket("Fuel", dec!(25.50), day(1)))
        .await
        .unwrap();
    assert!(!fuel.is_closed());
    assert_eq!(fuel.closing_timestamp(), -1);

    let Revenue::Project(trip) = service.get_revenue(owner, trip.id).await.unwrap() else {
        panic!("expected a project");
    };
    assert_eq!(trip.value(), dec!(125.50));

    clock.set(day(2));
    let closed = service.close_ticket(owner, trip.id, fuel.id).await.unwrap();
    assert!(closed.is_closed());
    assert_eq!(closed.status(), TicketStatus::Closed(day(2)));
    assert_eq!(closed.duration(), Some(TimeDelta::days(1)));

    service.delete_ticket(owner, trip.id, fuel.id).await.unwrap();
    let Revenue::Project(trip) = service.get_revenue(owner, trip.id).await.unwrap() else {
        panic!("expected a project");
    };
    assert!(trip.tickets.is_empty());
    assert_eq!(trip.value(), dec!(100.00));
}

#[tokio::test]
async fn test_second_close_rejected() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(5)));

    let trip = service
        .add_project(owner, project("Trip", dec!(1), day(0)))
        .await
        .unwrap();
    let fuel = service
        .add_ticket(owner, trip.id, ticket("Fuel", dec!(1), day(1)))
        .await
        .unwrap();

    let first = service.close_ticket(owner, trip.id, fuel.id).await.unwrap();
    let second = service.close_ticket(owner, trip.id, fuel.id).await;
    assert!(matches!(
        second,
        Err(ServiceError::Revenue(RevenueError::TicketAlreadyClosed(_)))
    ));

    let reloaded = service.get_revenue(owner, fuel.id).await.unwrap();
    let Revenue::Ticket(reloaded) = reloaded else {
        panic!("expected a ticket");
    };
    assert_eq!(reloaded.closing_date, first.closing_date);
}

#[tokio::test]
async fn test_future_ticket_closes_at_its_opening() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(1)));

    let trip = service
        .add_project(owner, project("Trip", dec!(1), day(0)))
        .await
        .unwrap();
    let booked = service
        .add_ticket(owner, trip.id, ticket("Hotel", dec!(80), day(4)))
        .await
        .unwrap();

    let closed = service.close_ticket(owner, trip.id, booked.id).await.unwrap();
    assert_eq!(closed.closing_date, Some(day(4)));
    assert_eq!(closed.duration(), Some(TimeDelta::zero()));
}

#[tokio::test]
async fn test_ticket_titles_unique_within_project() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(5)));

    let trip = service
        .add_project(owner, project("Trip", dec!(1), day(0)))
        .await
        .unwrap();
    let other = service
        .add_project(owner, project("Other", dec!(1), day(0)))
        .await
        .unwrap();

    service
        .add_ticket(owner, trip.id, ticket("Fuel", dec!(1), day(1)))
        .await
        .unwrap();
    // Case-sensitive, and scoped to the project
    service
        .add_ticket(owner, trip.id, ticket("fuel", dec!(1), day(1)))
        .await
        .unwrap();
    service
        .add_ticket(owner, other.id, ticket("Fuel", dec!(1), day(1)))
        .await
        .unwrap();

    let duplicate = service
        .add_ticket(owner, trip.id, ticket("Fuel", dec!(1), day(2)))
        .await;
    assert!(matches!(
        duplicate,
        Err(ServiceError::Revenue(RevenueError::DuplicateTitle(_)))
    ));
}

#[tokio::test]
async fn test_edit_ticket_only_while_pending() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(5)));

    let trip = service
        .add_project(owner, project("Trip", dec!(1), day(0)))
        .await
        .unwrap();
    let fuel = service
        .add_ticket(owner, trip.id, ticket("Fuel", dec!(10), day(1)))
        .await
        .unwrap();
    service
        .add_ticket(owner, trip.id, ticket("Food", dec!(10), day(1)))
        .await
        .unwrap();

    let edited = service
        .edit_ticket(owner, trip.id, fuel.id, ticket("Diesel", dec!(12.345), day(2)))
        .await
        .unwrap();
    assert_eq!(edited.title, "Diesel");
    assert_eq!(edited.value, dec!(12.35));

    let clash = service
        .edit_ticket(owner, trip.id, fuel.id, ticket("Food", dec!(1), day(2)))
        .await;
    assert!(matches!(
        clash,
        Err(ServiceError::Revenue(RevenueError::DuplicateTitle(_)))
    ));

    service.close_ticket(owner, trip.id, fuel.id).await.unwrap();
    let after_close = service
        .edit_ticket(owner, trip.id, fuel.id, ticket("Petrol", dec!(1), day(2)))
        .await;
    assert!(matches!(
        after_close,
        Err(ServiceError::Revenue(RevenueError::TicketAlreadyClosed(_)))
    ));
}

#[tokio::test]
async fn test_ticket_listing_by_state() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(10)));

    let trip = service
        .add_project(owner, project("Trip", dec!(1), day(0)))
        .await
        .unwrap();
    let mut ids = Vec::new();
    for (title, at) in [("a", 1), ("b", 2), ("c", 3)] {
        let created = service
            .add_ticket(owner, trip.id, ticket(title, dec!(1), day(at)))
            .await
            .unwrap();
        ids.push(created.id);
    }
    service.close_ticket(owner, trip.id, ids[1]).await.unwrap();

    let trip_id = trip.id;
    let list = |pending, closed| {
        let service = service.clone();
        async move {
            service
                .get_tickets(
                    owner,
                    trip_id,
                    RevenuePeriod::All,
                    TicketFilter { pending, closed },
                    PageRequest::default(),
                )
                .await
                .unwrap()
        }
    };

    let all = list(true, true).await;
    let titles: Vec<&str> = all.data.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["c", "b", "a"]);
    assert_eq!(all.meta.total, 3);

    let pending = list(true, false).await;
    assert_eq!(pending.meta.total, 2);
    assert!(pending.data.iter().all(|t| !t.is_closed()));

    let closed = list(false, true).await;
    assert_eq!(closed.meta.total, 1);
    assert_eq!(closed.data[0].title, "b");

    let none = list(false, false).await;
    assert_eq!(none.meta.total, 0);
    assert!(none.data.is_empty());
}

#[tokio::test]
async fn test_project_balance_counts_closed_tickets_only() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(40)));

    let trip = service
        .add_project(owner, project("Trip", dec!(100), day(0)))
        .await
        .unwrap();
    let early = service
        .add_ticket(owner, trip.id, ticket("early", dec!(5), day(2)))
        .await
        .unwrap();
    let late = service
        .add_ticket(owner, trip.id, ticket("late", dec!(7), day(20)))
        .await
        .unwrap();
    service
        .add_ticket(owner, trip.id, ticket("open", dec!(50), day(21)))
        .await
        .unwrap();
    service.close_ticket(owner, trip.id, early.id).await.unwrap();
    service.close_ticket(owner, trip.id, late.id).await.unwrap();

    let trip_id = trip.id;
    let balance = |period, include| {
        let service = service.clone();
        async move {
            service
                .get_project_balance(owner, trip_id, period, include)
                .await
                .unwrap()
        }
    };

    assert_eq!(balance(RevenuePeriod::All, true).await, dec!(112));
    assert_eq!(balance(RevenuePeriod::LastMonth, true).await, dec!(107));
    assert_eq!(balance(RevenuePeriod::All, false).await, dec!(100));
}

#[tokio::test]
async fn test_delete_project_cascades_to_tickets() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(5)));

    let trip = service
        .add_project(owner, project("Trip", dec!(1), day(0)))
        .await
        .unwrap();
    let fuel = service
        .add_ticket(owner, trip.id, ticket("Fuel", dec!(1), day(1)))
        .await
        .unwrap();

    service.delete_project(owner, trip.id).await.unwrap();

    assert!(service.get_revenue(owner, trip.id).await.is_err());
    assert!(service.get_revenue(owner, fuel.id).await.is_err());
    assert!(matches!(
        service
            .add_ticket(owner, trip.id, ticket("Late", dec!(1), day(2)))
            .await,
        Err(ServiceError::Revenue(RevenueError::NotFound(_)))
    ));
}
