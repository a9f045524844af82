//! Integration tests for general revenues, projects and the merged listing.

mod common;

use common::{clock_at, create_user, day, labelled, project, revenue, setup, ticket};
use neutron_core::label::LabelDraft;
use neutron_core::period::RevenuePeriod;
use neutron_core::revenue::{Revenue, RevenueError};
use neutron_db::entities::labels;
use neutron_db::repositories::{RevenueFilter, TicketFilter};
use neutron_db::services::RevenueQuery;
use neutron_db::{LabelRepository, RevenueRepository, RevenueService, ServiceError};
use neutron_shared::types::{Currency, PageRequest, RevenueId};
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};

// ============================================================================
// Creation and validation
// ============================================================================

#[tokio::test]
async fn test_add_revenue_rounds_value() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(10)));

    let created = service
        .add_revenue(owner, revenue("Consulting", dec!(1.005), day(3)))
        .await
        .unwrap();
    assert_eq!(created.value, dec!(1.01));
    assert_eq!(created.revenue_date, day(3));

    // Reading back twice yields the same stored value
    let first = service.get_revenue(owner, created.id).await.unwrap();
    let second = service.get_revenue(owner, created.id).await.unwrap();
    assert_eq!(first.value(), dec!(1.01));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_add_revenue_rejects_invalid_input() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(10)));

    let negative = service
        .add_revenue(owner, revenue("Refund", dec!(-1), day(1)))
        .await;
    assert!(matches!(
        negative,
        Err(ServiceError::Revenue(RevenueError::NegativeValue))
    ));

    let long = service
        .add_revenue(owner, revenue(&"x".repeat(31), dec!(1), day(1)))
        .await;
    assert!(matches!(
        long,
        Err(ServiceError::Revenue(RevenueError::InvalidTitle { .. }))
    ));
}

#[tokio::test]
async fn test_duplicate_title_conflicts_per_kind() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let other = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(10)));

    service
        .add_revenue(owner, revenue("Salary", dec!(10), day(1)))
        .await
        .unwrap();
    let duplicate = service
        .add_revenue(owner, revenue("Salary", dec!(20), day(2)))
        .await;
    assert!(matches!(
        duplicate,
        Err(ServiceError::Revenue(RevenueError::DuplicateTitle(_)))
    ));

    // Another owner, or another kind, may reuse the title
    service
        .add_revenue(other, revenue("Salary", dec!(10), day(1)))
        .await
        .unwrap();
    service
        .add_project(owner, project("Salary", dec!(5), day(1)))
        .await
        .unwrap();
    let duplicate_project = service
        .add_project(owner, project("Salary", dec!(5), day(1)))
        .await;
    assert!(matches!(
        duplicate_project,
        Err(ServiceError::Revenue(RevenueError::DuplicateTitle(_)))
    ));
}

// ============================================================================
// Labels
// ============================================================================

#[tokio::test]
async fn test_labels_are_capped_and_deduplicated() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(10)));

    let draft = labelled(
        "Gig",
        dec!(50),
        day(1),
        &[
            ("a", "#000000"),
            ("a", "#000000"),
            ("b", "#000000"),
            ("c", "#000000"),
            ("d", "#000000"),
            ("e", "#000000"),
            ("f", "#000000"),
        ],
    );
    let created = service.add_revenue(owner, draft).await.unwrap();

    let texts: Vec<&str> = created.labels.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, ["a", "b", "c", "d", "e"]);
}

#[tokio::test]
async fn test_shared_label_collected_after_last_reference() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(10)));
    let labels = LabelRepository::new(db.clone());

    let first = service
        .add_revenue(owner, labelled("First", dec!(1), day(1), &[("work", "#FF0000")]))
        .await
        .unwrap();
    let second = service
        .add_revenue(owner, labelled("Second", dec!(2), day(2), &[("work", "#FF0000")]))
        .await
        .unwrap();

    // One stored row shared by both revenues
    assert_eq!(first.labels[0].id, second.labels[0].id);
    let label_id = first.labels[0].id;
    assert_eq!(labels.count_references(&db, label_id).await.unwrap(), 2);
    assert_eq!(service.get_user_labels(owner).await.unwrap().len(), 1);

    service.delete_revenue(owner, first.id).await.unwrap();
    assert_eq!(labels.count_references(&db, label_id).await.unwrap(), 1);
    assert_eq!(service.get_user_labels(owner).await.unwrap().len(), 1);

    service.delete_revenue(owner, second.id).await.unwrap();
    assert_eq!(labels.count_references(&db, label_id).await.unwrap(), 0);
    assert!(service.get_user_labels(owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_edit_revenue_detaches_removed_labels() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(10)));

    let created = service
        .add_revenue(
            owner,
            labelled("Gig", dec!(1), day(1), &[("old", "#111111"), ("kept", "#222222")]),
        )
        .await
        .unwrap();

    let mut draft = labelled("Gig renamed", dec!(3.333), day(2), &[("kept", "#222222")]);
    draft.labels.push(LabelDraft::new("new", "#333333"));
    draft.description = Some("updated".to_string());
    let edited = service.edit_revenue(owner, created.id, draft).await.unwrap();

    assert_eq!(edited.id, created.id);
    assert_eq!(edited.owner, owner);
    assert_eq!(edited.title, "Gig renamed");
    assert_eq!(edited.value, dec!(3.33));
    assert_eq!(edited.description.as_deref(), Some("updated"));
    let texts: Vec<&str> = edited.labels.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, ["kept", "new"]);

    // "old" had no other reference and is gone from the registry
    let all: Vec<String> = service
        .get_user_labels(owner)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.text)
        .collect();
    assert_eq!(all, ["kept", "new"]);
}

#[tokio::test]
async fn test_referenced_label_survives_collection() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(10)));
    let registry = LabelRepository::new(db.clone());

    let created = service
        .add_revenue(owner, labelled("Gig", dec!(1), day(1), &[("work", "#FF0000")]))
        .await
        .unwrap();
    let label_id = created.labels[0].id;

    let deleted = registry
        .delete_unreferenced(&db, &[label_id.into_inner()])
        .await
        .unwrap();
    assert_eq!(deleted, 0);
    assert_eq!(registry.count_references(&db, label_id).await.unwrap(), 1);

    // Associations restrict deleting the label row itself
    let forced = labels::Entity::delete_by_id(label_id.into_inner())
        .exec(&db)
        .await;
    assert!(forced.is_err());
    let reread = service.get_revenue(owner, created.id).await.unwrap();
    assert!(matches!(reread, Revenue::General(r) if r.labels.len() == 1));
}

#[tokio::test]
async fn test_concurrent_edits_leave_consistent_labels() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(10)));

    let created = service
        .add_revenue(owner, labelled("Gig", dec!(1), day(1), &[("start", "#000000")]))
        .await
        .unwrap();

    let (left, right) = tokio::join!(
        service.edit_revenue(
            owner,
            created.id,
            labelled("Gig", dec!(2), day(1), &[("left", "#111111"), ("both", "#333333")]),
        ),
        service.edit_revenue(
            owner,
            created.id,
            labelled("Gig", dec!(3), day(1), &[("right", "#222222"), ("both", "#333333")]),
        ),
    );
    left.unwrap();
    right.unwrap();

    let Revenue::General(last) = service.get_revenue(owner, created.id).await.unwrap() else {
        panic!("expected a general revenue");
    };
    let texts: Vec<&str> = last.labels.iter().map(|l| l.text.as_str()).collect();
    assert!(
        texts == ["both", "left"] || texts == ["both", "right"],
        "unexpected labels {texts:?}"
    );
    let expected_value = if texts[1] == "left" { dec!(2) } else { dec!(3) };
    assert_eq!(last.value, expected_value);

    // Every stored label is attached, and every attached label is stored
    assert_eq!(service.get_user_labels(owner).await.unwrap(), last.labels);
    assert_eq!(labels::Entity::find().count(&db).await.unwrap(), 2);
}

#[tokio::test]
async fn test_edit_revenue_keeps_own_title() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(10)));

    let created = service
        .add_revenue(owner, revenue("Salary", dec!(10), day(1)))
        .await
        .unwrap();
    service
        .add_revenue(owner, revenue("Bonus", dec!(10), day(1)))
        .await
        .unwrap();

    service
        .edit_revenue(owner, created.id, revenue("Salary", dec!(12), day(1)))
        .await
        .unwrap();
    let clash = service
        .edit_revenue(owner, created.id, revenue("Bonus", dec!(12), day(1)))
        .await;
    assert!(matches!(
        clash,
        Err(ServiceError::Revenue(RevenueError::DuplicateTitle(_)))
    ));
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_merged_pagination_sums_counts() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(20)));

    for (title, at) in [("g1", 1), ("g2", 5), ("g3", 9)] {
        service
            .add_revenue(owner, revenue(title, dec!(1), day(at)))
            .await
            .unwrap();
    }
    for (title, at) in [("p1", 3), ("p2", 7)] {
        service
            .add_project(owner, project(title, dec!(1), day(at)))
            .await
            .unwrap();
    }

    let query = RevenueQuery::new(RevenuePeriod::All);
    let mut seen = Vec::new();
    for page in 1..=3 {
        let result = service
            .get_revenues(owner, &query, PageRequest::new(page, 2))
            .await
            .unwrap();
        assert!(result.data.len() <= 2);
        assert_eq!(result.meta.total, 5);
        assert_eq!(result.meta.total_pages, 3);
        seen.extend(result.data.iter().map(|r| r.title().to_string()));
    }

    assert_eq!(seen, ["g3", "p2", "g2", "p1", "g1"]);
}

#[tokio::test]
async fn test_listing_respects_period_and_kinds() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(40)));

    service
        .add_revenue(owner, revenue("old", dec!(1), day(1)))
        .await
        .unwrap();
    service
        .add_revenue(owner, revenue("recent", dec!(1), day(35)))
        .await
        .unwrap();
    service
        .add_project(owner, project("trip", dec!(1), day(38)))
        .await
        .unwrap();

    let mut query = RevenueQuery::new(RevenuePeriod::LastMonth);
    let page = service
        .get_revenues(owner, &query, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 2);

    query.projects = false;
    let page = service
        .get_revenues(owner, &query, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 1);
    assert!(matches!(&page.data[0], Revenue::General(r) if r.title == "recent"));
}

#[tokio::test]
async fn test_label_filter_matches_any() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(10)));

    service
        .add_revenue(owner, labelled("a", dec!(1), day(1), &[("work", "#000000")]))
        .await
        .unwrap();
    service
        .add_revenue(owner, labelled("b", dec!(1), day(2), &[("fun", "#000000")]))
        .await
        .unwrap();
    service
        .add_revenue(owner, labelled("c", dec!(1), day(3), &[("misc", "#000000")]))
        .await
        .unwrap();
    service
        .add_project(owner, project("p", dec!(1), day(4)))
        .await
        .unwrap();

    let query = RevenueQuery::new(RevenuePeriod::All)
        .with_labels(vec!["work".to_string(), "fun".to_string()]);
    let page = service
        .get_revenues(owner, &query, PageRequest::default())
        .await
        .unwrap();

    let titles: Vec<&str> = page.data.iter().map(Revenue::title).collect();
    assert_eq!(titles, ["b", "a"]);
    assert_eq!(page.meta.total, 2);
}

#[tokio::test]
async fn test_unbounded_reads_return_every_row() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(10)));
    let repo = RevenueRepository::new(db.clone());

    for (title, at) in [("g1", 1), ("g2", 2), ("g3", 3)] {
        service
            .add_revenue(owner, revenue(title, dec!(1), day(at)))
            .await
            .unwrap();
    }
    let trip = service
        .add_project(owner, project("trip", dec!(1), day(1)))
        .await
        .unwrap();
    for (title, at) in [("t1", 2), ("t2", 3)] {
        service
            .add_ticket(owner, trip.id, ticket(title, dec!(1), day(at)))
            .await
            .unwrap();
    }

    let filter = RevenueFilter::default();
    let all = repo.get_general(owner, &filter, 0, None).await.unwrap();
    assert_eq!(all.len(), 3);
    let rest = repo.get_general(owner, &filter, 1, None).await.unwrap();
    let titles: Vec<&str> = rest.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["g2", "g1"]);

    assert_eq!(repo.get_projects(owner, &filter, 0, None).await.unwrap().len(), 1);
    assert!(repo.get_projects(owner, &filter, 1, None).await.unwrap().is_empty());

    let tickets = repo
        .get_tickets(owner, trip.id, &filter, TicketFilter::default(), 0, None)
        .await
        .unwrap();
    assert_eq!(tickets.len(), 2);
    let older = repo
        .get_tickets(owner, trip.id, &filter, TicketFilter::default(), 1, None)
        .await
        .unwrap();
    assert_eq!(older[0].title, "t1");
}

// ============================================================================
// Lookup and deletion
// ============================================================================

#[tokio::test]
async fn test_revenues_are_scoped_to_owner() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let stranger = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(10)));

    let created = service
        .add_revenue(owner, revenue("Mine", dec!(1), day(1)))
        .await
        .unwrap();

    assert!(service.get_revenue(stranger, created.id).await.is_err());
    assert!(service.delete_revenue(stranger, created.id).await.is_err());
    assert!(service.get_revenue(owner, created.id).await.is_ok());
}

#[tokio::test]
async fn test_delete_resolves_kind() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(10)));

    let general = service
        .add_revenue(owner, revenue("g", dec!(1), day(1)))
        .await
        .unwrap();
    let trip = service
        .add_project(owner, project("p", dec!(1), day(1)))
        .await
        .unwrap();

    service.delete_revenue(owner, general.id).await.unwrap();
    service.delete_revenue(owner, trip.id).await.unwrap();

    for id in [general.id, trip.id, RevenueId::new()] {
        assert!(matches!(
            service.delete_revenue(owner, id).await,
            Err(ServiceError::Revenue(RevenueError::NotFound(_)))
        ));
    }
}

#[tokio::test]
async fn test_edit_project_updates_initial_revenue() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let service = RevenueService::new(db.clone(), clock_at(day(10)));

    let created = service
        .add_project(owner, project("Trip", dec!(100), day(1)))
        .await
        .unwrap();
    let edited = service
        .edit_project(owner, created.id, project("Road trip", dec!(80.555), day(2)))
        .await
        .unwrap();

    assert_eq!(edited.title, "Road trip");
    assert_eq!(edited.revenue_date, day(2));
    assert_eq!(edited.initial_revenue.id, created.initial_revenue.id);
    assert_eq!(edited.initial_revenue.value, dec!(80.56));
    assert_eq!(edited.initial_revenue.revenue_date, day(2));
    assert_eq!(edited.value(), dec!(80.56));
}
