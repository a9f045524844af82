//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes over the revenue ledger
//! - Token authentication middleware
//! - Response bodies and the error boundary

pub mod error;
pub mod middleware;
pub mod responses;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use neutron_core::Clock;
use neutron_core::currency::{RateCache, RateProvider};
use neutron_db::{CurrencyService, RevenueService, UserRepository, WalletService};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Upper bound on a single request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection, used directly only for health checks.
    pub db: DatabaseConnection,
    /// User lookup for authentication.
    pub users: UserRepository,
    /// Revenue ledger operations.
    pub revenues: RevenueService,
    /// Currency preference and conversion.
    pub currency: CurrencyService,
    /// Wallet totals.
    pub wallet: WalletService,
}

impl AppState {
    /// Wires every service around one connection, rate cache and clock.
    /// Revenue writes and currency conversions share one ledger gate.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        rates: Arc<RateCache>,
        provider: Arc<dyn RateProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let currency = CurrencyService::new(db.clone(), rates, provider, Arc::clone(&clock));
        let revenues = RevenueService::new(db.clone(), Arc::clone(&clock))
            .with_ledger_gate(currency.ledger_gate());

        Self {
            db: db.clone(),
            users: UserRepository::new(db.clone()),
            revenues,
            currency,
            wallet: WalletService::new(db, clock),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
