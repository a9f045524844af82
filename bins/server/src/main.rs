//! Neutron API Server
//!
//! Main entry point for the revenue ledger service.

use std::sync::Arc;

use anyhow::Context;
use chrono::TimeDelta;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use neutron_api::{AppState, create_router};
use neutron_core::SystemClock;
use neutron_core::currency::{HttpRateProvider, RateCache};
use neutron_db::connect_with;
use neutron_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neutron=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let provider = HttpRateProvider::from_config(&config.exchange_rates)?;
    let refresh_interval = i64::try_from(config.exchange_rates.refresh_interval_secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .context("Exchange rate refresh interval is out of range")?;
    info!(
        endpoint = %provider.endpoint(),
        refresh_interval_secs = config.exchange_rates.refresh_interval_secs,
        "Exchange rate provider configured"
    );

    let state = AppState::new(
        db,
        Arc::new(RateCache::new(refresh_interval)),
        Arc::new(provider),
        Arc::new(SystemClock),
    );

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
