//! Project and ticket routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::{DateTime, Utc};
use neutron_core::revenue::TicketDraft;
use neutron_db::repositories::TicketFilter;
use neutron_shared::types::{PageRequest, RevenueId, UserId};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::parse_period;
use crate::{
    AppState,
    error::{bad_request, error_response},
    middleware::AuthUser,
    responses::{ProjectResponse, TicketResponse},
    routes::revenues::ProjectRequest,
};

/// Creates the project routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/{user_id}/projects/{project_id}",
            patch(update_project).delete(delete_project),
        )
        .route(
            "/users/{user_id}/projects/{project_id}/balance",
            get(get_balance),
        )
        .route(
            "/users/{user_id}/projects/{project_id}/tickets",
            get(list_tickets).post(create_ticket),
        )
        .route(
            "/users/{user_id}/projects/{project_id}/tickets/{ticket_id}",
            patch(update_ticket).delete(delete_ticket),
        )
        .route(
            "/users/{user_id}/projects/{project_id}/tickets/{ticket_id}/close",
            post(close_ticket),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for the balance endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct BalanceQuery {
    /// Period name; closed tickets received before it are left out.
    pub period: Option<String>,
    /// Add closed tickets to the initial value (default true).
    pub include_closed: Option<bool>,
}

/// Query parameters for the ticket listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListTicketsQuery {
    /// Page number, 1-indexed.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
    /// Period name.
    pub period: Option<String>,
    /// Include pending tickets (default true).
    pub pending: Option<bool>,
    /// Include closed tickets (default true).
    pub closed: Option<bool>,
}

/// Body for adding or editing a ticket.
#[derive(Debug, Deserialize)]
pub struct TicketRequest {
    /// Title, unique within the project.
    pub title: String,
    /// Value.
    pub value: Decimal,
    /// Epoch millis.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub revenue_date: DateTime<Utc>,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
}

impl From<TicketRequest> for TicketDraft {
    fn from(req: TicketRequest) -> Self {
        Self {
            title: req.title,
            value: req.value,
            revenue_date: req.revenue_date,
            description: req.description,
        }
    }
}

// ============================================================================
// Project Handlers
// ============================================================================

/// PATCH `/users/{user_id}/projects/{project_id}` - Edit title, opening value and date.
async fn update_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, project_id)): Path<(UserId, RevenueId)>,
    Json(request): Json<ProjectRequest>,
) -> impl IntoResponse {
    match state
        .revenues
        .edit_project(auth.user_id(), project_id, request.into())
        .await
    {
        Ok(project) => (StatusCode::OK, Json(ProjectResponse::from(project))).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE `/users/{user_id}/projects/{project_id}` - Delete a project with its tickets.
async fn delete_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, project_id)): Path<(UserId, RevenueId)>,
) -> impl IntoResponse {
    match state
        .revenues
        .delete_project(auth.user_id(), project_id)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

/// GET `/users/{user_id}/projects/{project_id}/balance` - Initial value plus closed tickets.
async fn get_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, project_id)): Path<(UserId, RevenueId)>,
    Query(params): Query<BalanceQuery>,
) -> impl IntoResponse {
    let period = match parse_period(params.period.as_deref()) {
        Ok(period) => period,
        Err(e) => return bad_request(e),
    };

    match state
        .revenues
        .get_project_balance(
            auth.user_id(),
            project_id,
            period,
            params.include_closed.unwrap_or(true),
        )
        .await
    {
        Ok(balance) => (
            StatusCode::OK,
            Json(json!({ "project_id": project_id, "balance": balance })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

// ============================================================================
// Ticket Handlers
// ============================================================================

/// GET `/users/{user_id}/projects/{project_id}/tickets` - Page of tickets, newest first.
async fn list_tickets(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, project_id)): Path<(UserId, RevenueId)>,
    Query(params): Query<ListTicketsQuery>,
) -> impl IntoResponse {
    let period = match parse_period(params.period.as_deref()) {
        Ok(period) => period,
        Err(e) => return bad_request(e),
    };
    let defaults = PageRequest::default();
    let page = PageRequest::new(
        params.page.unwrap_or(defaults.page),
        params.per_page.unwrap_or(defaults.per_page),
    );
    let states = TicketFilter {
        pending: params.pending.unwrap_or(true),
        closed: params.closed.unwrap_or(true),
    };

    match state
        .revenues
        .get_tickets(auth.user_id(), project_id, period, states, page)
        .await
    {
        Ok(page) => (StatusCode::OK, Json(page.map(TicketResponse::from))).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST `/users/{user_id}/projects/{project_id}/tickets` - Add a pending ticket.
async fn create_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, project_id)): Path<(UserId, RevenueId)>,
    Json(request): Json<TicketRequest>,
) -> impl IntoResponse {
    let owner = auth.user_id();
    match state
        .revenues
        .add_ticket(owner, project_id, request.into())
        .await
    {
        Ok(ticket) => {
            info!(user_id = %owner, ticket_id = %ticket.id, "Ticket created via API");
            (StatusCode::CREATED, Json(TicketResponse::from(ticket))).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// PATCH `/users/{user_id}/projects/{project_id}/tickets/{ticket_id}` - Edit a pending ticket.
async fn update_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, project_id, ticket_id)): Path<(UserId, RevenueId, RevenueId)>,
    Json(request): Json<TicketRequest>,
) -> impl IntoResponse {
    match state
        .revenues
        .edit_ticket(auth.user_id(), project_id, ticket_id, request.into())
        .await
    {
        Ok(ticket) => (StatusCode::OK, Json(TicketResponse::from(ticket))).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST `/users/{user_id}/projects/{project_id}/tickets/{ticket_id}/close` - Close a ticket.
async fn close_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, project_id, ticket_id)): Path<(UserId, RevenueId, RevenueId)>,
) -> impl IntoResponse {
    match state
        .revenues
        .close_ticket(auth.user_id(), project_id, ticket_id)
        .await
    {
        Ok(ticket) => (StatusCode::OK, Json(TicketResponse::from(ticket))).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE `/users/{user_id}/projects/{project_id}/tickets/{ticket_id}` - Delete a ticket.
async fn delete_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, project_id, ticket_id)): Path<(UserId, RevenueId, RevenueId)>,
) -> impl IntoResponse {
    match state
        .revenues
        .delete_ticket(auth.user_id(), project_id, ticket_id)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}
