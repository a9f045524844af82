//! Account, wallet and currency preference routes.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use neutron_db::ServiceError;
use neutron_shared::types::Currency;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::{parse_labels, parse_period};
use crate::{
    AppState,
    error::{bad_request, error_response},
    middleware::AuthUser,
};

/// Creates the user-level routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/{user_id}", delete(delete_user))
        .route("/users/{user_id}/wallet", get(get_wallet))
        .route(
            "/users/{user_id}/currency",
            get(get_currency).patch(change_currency),
        )
        .route(
            "/users/{user_id}/currency/conversion",
            get(get_conversion),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for the wallet.
#[derive(Debug, Default, Deserialize)]
pub struct WalletQuery {
    /// Period name.
    pub period: Option<String>,
    /// Comma-separated label texts.
    pub labels: Option<String>,
}

/// Body for changing the ledger currency.
#[derive(Debug, Deserialize)]
pub struct ChangeCurrencyRequest {
    /// Enum name (`EURO`) or ISO code (`EUR`).
    pub currency: String,
}

/// A currency as rendered to clients.
#[derive(Debug, Serialize)]
pub struct CurrencyResponse {
    /// Enum name.
    pub name: &'static str,
    /// ISO 4217 code.
    pub code: &'static str,
    /// Display symbol.
    pub symbol: &'static str,
}

impl From<Currency> for CurrencyResponse {
    fn from(currency: Currency) -> Self {
        Self {
            name: currency.name(),
            code: currency.iso_code(),
            symbol: currency.symbol(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// DELETE `/users/{user_id}` - Remove the account and everything it owns.
async fn delete_user(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let user = auth.user_id();
    match state.users.delete(user).await {
        Ok(true) => {
            info!(user_id = %user, "Account deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => error_response(ServiceError::UserNotFound(user)),
        Err(e) => error_response(ServiceError::from(e)),
    }
}

/// GET `/users/{user_id}/wallet` - Period earnings and trend.
async fn get_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<WalletQuery>,
) -> impl IntoResponse {
    let period = match parse_period(params.period.as_deref()) {
        Ok(period) => period,
        Err(e) => return bad_request(e),
    };
    let labels = parse_labels(params.labels.as_deref());

    match state
        .wallet
        .get_wallet_status(auth.user_id(), period, &labels)
        .await
    {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET `/users/{user_id}/currency` - Current ledger currency.
async fn get_currency(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    match state.currency.currency(auth.user_id()).await {
        Ok(currency) => (
            StatusCode::OK,
            Json(json!({ "currency": CurrencyResponse::from(currency) })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// PATCH `/users/{user_id}/currency` - Switch currency and start converting the ledger.
///
/// Answers `202 Accepted` once the preference has flipped; the rewrite runs in
/// the background and is observed through `/currency/conversion`.
async fn change_currency(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<ChangeCurrencyRequest>,
) -> impl IntoResponse {
    let currency = match Currency::from_str(&request.currency) {
        Ok(currency) => currency,
        Err(e) => return bad_request(e),
    };
    let user = auth.user_id();

    match state.currency.change_currency(user, currency).await {
        Ok(Some(handle)) => {
            info!(user_id = %user, currency = %currency, "Currency change accepted");
            (
                StatusCode::ACCEPTED,
                Json(json!({
                    "currency": CurrencyResponse::from(currency),
                    "conversion": handle.status(),
                })),
            )
                .into_response()
        }
        Ok(None) => (
            StatusCode::OK,
            Json(json!({
                "currency": CurrencyResponse::from(currency),
                "conversion": null,
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET `/users/{user_id}/currency/conversion` - Status of the latest conversion run.
async fn get_conversion(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let user = auth.user_id();
    match state.currency.currency(user).await {
        Ok(currency) => (
            StatusCode::OK,
            Json(json!({
                "currency": CurrencyResponse::from(currency),
                "conversion": state.currency.latest_status(user),
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
