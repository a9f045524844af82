//! API route definitions.

use std::str::FromStr;

use axum::{Router, middleware};
use neutron_core::period::RevenuePeriod;

use crate::{AppState, middleware::auth_middleware};

pub mod health;
pub mod projects;
pub mod revenues;
pub mod users;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Every protected path carries `{user_id}`; route_layer runs after matching
    // so the middleware can read it.
    let protected_routes = Router::new()
        .merge(revenues::routes())
        .merge(projects::routes())
        .merge(users::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}

/// Parses an optional period name; absent means the default window.
pub(crate) fn parse_period(raw: Option<&str>) -> Result<RevenuePeriod, String> {
    raw.map_or(Ok(RevenuePeriod::default()), |raw| {
        RevenuePeriod::from_str(raw).map_err(|e| e.to_string())
    })
}

/// Splits a comma-separated label list, dropping empty entries.
pub(crate) fn parse_labels(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned)
            .collect()
    })
    .unwrap_or_default()
}
