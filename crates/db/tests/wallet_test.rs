//! Integration tests for wallet totals and trend.

mod common;

use common::{clock_at, create_user, day, labelled, project, revenue, setup, ticket};
use neutron_core::period::RevenuePeriod;
use neutron_core::wallet::NO_HISTORY_TREND;
use neutron_db::{RevenueService, WalletService};
use neutron_shared::types::Currency;
use rstest::rstest;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_trend_against_previous_period() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let clock = clock_at(day(60));
    let revenues = RevenueService::new(db.clone(), clock.clone());
    let wallet = WalletService::new(db.clone(), clock);

    // Current month starts at day 30, the previous one at day 0
    revenues
        .add_revenue(owner, revenue("now", dec!(100), day(45)))
        .await
        .unwrap();
    let trip = revenues
        .add_project(owner, project("trip", dec!(40), day(50)))
        .await
        .unwrap();
    revenues
        .add_ticket(owner, trip.id, ticket("fuel", dec!(10), day(51)))
        .await
        .unwrap();
    revenues
        .add_revenue(owner, revenue("before", dec!(100), day(10)))
        .await
        .unwrap();
    revenues
        .add_revenue(owner, revenue("ancient", dec!(999), day(-5)))
        .await
        .unwrap();

    let status = wallet
        .get_wallet_status(owner, RevenuePeriod::LastMonth, &[])
        .await
        .unwrap();
    assert_eq!(status.total_earnings, dec!(150));
    assert_eq!(status.previous_earnings, dec!(100));
    assert_eq!(status.trend, dec!(50));
}

#[rstest]
#[case::short_period(RevenuePeriod::LastWeek)]
#[case::unbounded(RevenuePeriod::All)]
#[tokio::test]
async fn test_no_previous_earnings_reports_full_trend(#[case] period: RevenuePeriod) {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let clock = clock_at(day(60));
    let revenues = RevenueService::new(db.clone(), clock.clone());
    let wallet = WalletService::new(db.clone(), clock);

    revenues
        .add_revenue(owner, revenue("now", dec!(42.10), day(59)))
        .await
        .unwrap();

    let status = wallet.get_wallet_status(owner, period, &[]).await.unwrap();
    assert_eq!(status.total_earnings, dec!(42.10));
    assert_eq!(status.previous_earnings, dec!(0));
    assert_eq!(status.trend, NO_HISTORY_TREND);
}

#[tokio::test]
async fn test_label_filter_narrows_totals() {
    let db = setup().await;
    let owner = create_user(&db, Currency::Dollar).await;
    let clock = clock_at(day(10));
    let revenues = RevenueService::new(db.clone(), clock.clone());
    let wallet = WalletService::new(db.clone(), clock);

    revenues
        .add_revenue(owner, labelled("a", dec!(30), day(5), &[("work", "#00FF00")]))
        .await
        .unwrap();
    revenues
        .add_revenue(owner, labelled("b", dec!(12), day(6), &[("fun", "#00FF00")]))
        .await
        .unwrap();
    revenues
        .add_project(owner, project("p", dec!(500), day(7)))
        .await
        .unwrap();

    let all = wallet
        .get_wallet_status(owner, RevenuePeriod::All, &[])
        .await
        .unwrap();
    assert_eq!(all.total_earnings, dec!(542));

    let work = wallet
        .get_wallet_status(owner, RevenuePeriod::All, &["work".to_string()])
        .await
        .unwrap();
    assert_eq!(work.total_earnings, dec!(30));
}
