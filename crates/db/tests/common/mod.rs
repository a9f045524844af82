//! Shared fixtures for the database integration tests.
//!
//! Every test gets its own in-memory SQLite database with the full schema.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use neutron_core::ManualClock;
use neutron_core::currency::{CurrencyError, RateCache, RateProvider, RateTable};
use neutron_core::label::LabelDraft;
use neutron_core::revenue::{ProjectDraft, RevenueDraft, TicketDraft};
use neutron_db::migration::{Migrator, MigratorTrait};
use neutron_db::repositories::CreateUserInput;
use neutron_db::UserRepository;
use neutron_shared::types::{Currency, UserId};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Fresh migrated database.
pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Creates a user keeping their ledger in `currency`.
pub async fn create_user(db: &DatabaseConnection, currency: Currency) -> UserId {
    let id = uuid::Uuid::new_v4();
    let user = UserRepository::new(db.clone())
        .create(CreateUserInput {
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            email: format!("ada-{id}@example.com"),
            token: format!("token-{id}"),
            currency,
        })
        .await
        .expect("Failed to create user");
    UserId::from_uuid(user.id)
}

/// Midnight of day `n` counted from 2024-06-01.
pub fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() + TimeDelta::days(n)
}

/// Clock frozen at `at`.
pub fn clock_at(at: DateTime<Utc>) -> Arc<ManualClock> {
    Arc::new(ManualClock::new(at))
}

pub fn revenue(title: &str, value: Decimal, at: DateTime<Utc>) -> RevenueDraft {
    RevenueDraft {
        title: title.to_string(),
        value,
        revenue_date: at,
        description: None,
        labels: Vec::new(),
    }
}

pub fn labelled(
    title: &str,
    value: Decimal,
    at: DateTime<Utc>,
    labels: &[(&str, &str)],
) -> RevenueDraft {
    RevenueDraft {
        labels: labels
            .iter()
            .map(|(text, color)| LabelDraft::new(*text, *color))
            .collect(),
        ..revenue(title, value, at)
    }
}

pub fn project(title: &str, value: Decimal, at: DateTime<Utc>) -> ProjectDraft {
    ProjectDraft {
        title: title.to_string(),
        value,
        revenue_date: at,
    }
}

pub fn ticket(title: &str, value: Decimal, at: DateTime<Utc>) -> TicketDraft {
    TicketDraft {
        title: title.to_string(),
        value,
        revenue_date: at,
        description: None,
    }
}

/// Rate provider returning a fixed table, or failing on demand.
#[derive(Debug)]
pub struct StubProvider {
    pub rates: RateTable,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl StubProvider {
    pub fn new(pairs: &[(Currency, Decimal)]) -> Self {
        Self {
            rates: RateTable::from_pairs(pairs.iter().copied()),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateProvider for StubProvider {
    async fn fetch_rates(&self) -> Result<RateTable, CurrencyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CurrencyError::MalformedResponse("provider down".to_string()));
        }
        Ok(self.rates.clone())
    }
}

/// Cache already holding `pairs`, fresh at `at`.
pub fn fresh_cache(pairs: &[(Currency, Decimal)], at: DateTime<Utc>) -> Arc<RateCache> {
    Arc::new(RateCache::with_rates(
        RateTable::from_pairs(pairs.iter().copied()),
        at,
        TimeDelta::hours(24),
    ))
}
