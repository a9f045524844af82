//! General revenue and merged listing routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use neutron_core::label::LabelDraft;
use neutron_core::revenue::{ProjectDraft, RevenueDraft};
use neutron_db::services::RevenueQuery;
use neutron_shared::types::{PageRequest, RevenueId, UserId};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{parse_labels, parse_period};
use crate::{
    AppState,
    error::{bad_request, error_response},
    middleware::AuthUser,
    responses::{GeneralRevenueResponse, LabelResponse, ProjectResponse, RevenueResponse},
};

/// Creates the revenue routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/{user_id}/revenues",
            get(list_revenues).post(create_revenue),
        )
        .route("/users/{user_id}/revenues/labels", get(list_labels))
        .route(
            "/users/{user_id}/revenues/{revenue_id}",
            get(get_revenue)
                .patch(update_revenue)
                .delete(delete_revenue),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for the merged listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListRevenuesQuery {
    /// Page number, 1-indexed.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
    /// Period name, e.g. `LAST_MONTH`.
    pub period: Option<String>,
    /// Comma-separated label texts.
    pub labels: Option<String>,
    /// Include general revenues (default true).
    pub general: Option<bool>,
    /// Include projects (default true).
    pub projects: Option<bool>,
}

/// Body for creating or editing a general revenue.
#[derive(Debug, Deserialize)]
pub struct RevenueRequest {
    /// Title.
    pub title: String,
    /// Value in the owner's currency.
    pub value: Decimal,
    /// Epoch millis.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub revenue_date: DateTime<Utc>,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
    /// Labels, at most five are kept.
    #[serde(default)]
    pub labels: Vec<LabelDraft>,
}

impl From<RevenueRequest> for RevenueDraft {
    fn from(req: RevenueRequest) -> Self {
        Self {
            title: req.title,
            value: req.value,
            revenue_date: req.revenue_date,
            description: req.description,
            labels: req.labels,
        }
    }
}

/// Body for creating or editing a project.
#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    /// Title.
    pub title: String,
    /// Opening balance.
    pub value: Decimal,
    /// Epoch millis.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub revenue_date: DateTime<Utc>,
}

impl From<ProjectRequest> for ProjectDraft {
    fn from(req: ProjectRequest) -> Self {
        Self {
            title: req.title,
            value: req.value,
            revenue_date: req.revenue_date,
        }
    }
}

/// Body for `POST /revenues`, tagged by `kind`.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreateRevenueRequest {
    /// A general revenue.
    General(RevenueRequest),
    /// A project with its opening balance.
    Project(ProjectRequest),
}

// ============================================================================
// Handlers
// ============================================================================

/// GET `/users/{user_id}/revenues` - Merged page of general revenues and projects.
async fn list_revenues(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListRevenuesQuery>,
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
    let query = RevenueQuery {
        general: params.general.unwrap_or(true),
        projects: params.projects.unwrap_or(true),
        ..RevenueQuery::new(period).with_labels(parse_labels(params.labels.as_deref()))
    };

    match state
        .revenues
        .get_revenues(auth.user_id(), &query, page)
        .await
    {
        Ok(page) => (StatusCode::OK, Json(page.map(RevenueResponse::from))).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST `/users/{user_id}/revenues` - Create a general revenue or a project.
async fn create_revenue(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateRevenueRequest>,
) -> impl IntoResponse {
    let owner = auth.user_id();
    match request {
        CreateRevenueRequest::General(req) => {
            match state.revenues.add_revenue(owner, req.into()).await {
                Ok(revenue) => {
                    info!(user_id = %owner, revenue_id = %revenue.id, "Revenue created via API");
                    (
                        StatusCode::CREATED,
                        Json(RevenueResponse::General(GeneralRevenueResponse::from(revenue))),
                    )
                        .into_response()
                }
                Err(e) => error_response(e),
            }
        }
        CreateRevenueRequest::Project(req) => {
            match state.revenues.add_project(owner, req.into()).await {
                Ok(project) => {
                    info!(user_id = %owner, project_id = %project.id, "Project created via API");
                    (
                        StatusCode::CREATED,
                        Json(RevenueResponse::Project(ProjectResponse::from(project))),
                    )
                        .into_response()
                }
                Err(e) => error_response(e),
            }
        }
    }
}

/// GET `/users/{user_id}/revenues/labels` - Labels on the user's revenues.
async fn list_labels(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    match state.revenues.get_user_labels(auth.user_id()).await {
        Ok(labels) => {
            let labels: Vec<LabelResponse> = labels.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(json!({ "labels": labels }))).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET `/users/{user_id}/revenues/{revenue_id}` - Any revenue by id.
async fn get_revenue(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, revenue_id)): Path<(UserId, RevenueId)>,
) -> impl IntoResponse {
    match state.revenues.get_revenue(auth.user_id(), revenue_id).await {
        Ok(revenue) => (StatusCode::OK, Json(RevenueResponse::from(revenue))).into_response(),
        Err(e) => error_response(e),
    }
}

/// PATCH `/users/{user_id}/revenues/{revenue_id}` - Edit a general revenue.
async fn update_revenue(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, revenue_id)): Path<(UserId, RevenueId)>,
    Json(request): Json<RevenueRequest>,
) -> impl IntoResponse {
    match state
        .revenues
        .edit_revenue(auth.user_id(), revenue_id, request.into())
        .await
    {
        Ok(revenue) => (
            StatusCode::OK,
            Json(RevenueResponse::General(revenue.into())),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE `/users/{user_id}/revenues/{revenue_id}` - Delete a general revenue or project.
async fn delete_revenue(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, revenue_id)): Path<(UserId, RevenueId)>,
) -> impl IntoResponse {
    match state
        .revenues
        .delete_revenue(auth.user_id(), revenue_id)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}
