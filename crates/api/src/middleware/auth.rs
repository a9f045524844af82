//! Authentication middleware for protected routes.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{FromRequestParts, Path, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use neutron_shared::types::UserId;
use serde_json::json;
use tracing::{debug, error};

use crate::AppState;

/// Header carrying the caller's access token.
pub const TOKEN_HEADER: &str = "token";

fn unauthorized(message: &'static str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "UNAUTHORIZED",
            "message": message
        })),
    )
        .into_response()
}

/// Authentication middleware that matches the `token` header against the
/// user named by the `{user_id}` path segment.
///
/// Must be applied with `route_layer` so the path parameters are already
/// extracted. On success the [`AuthUser`] is stored in request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(user_id) = params
        .get("user_id")
        .and_then(|raw| raw.parse::<UserId>().ok())
    else {
        return unauthorized("A valid user id is required");
    };

    let Some(token) = request
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned)
    else {
        return unauthorized("The token header is required");
    };

    match state.users.authenticate(user_id, &token).await {
        Ok(Some(_)) => {
            request.extensions_mut().insert(AuthUser(user_id));
            next.run(request).await
        }
        Ok(None) => {
            debug!(user_id = %user_id, "Token rejected");
            unauthorized("Invalid user or token")
        }
        Err(e) => {
            error!(error = %e, "Failed to authenticate user");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "INTERNAL_ERROR",
                    "message": "An internal error occurred"
                })),
            )
                .into_response()
        }
    }
}

/// Extractor for the authenticated user.
///
/// ```ignore
/// async fn handler(auth: AuthUser) -> impl IntoResponse {
///     let owner = auth.user_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

impl AuthUser {
    /// Returns the authenticated user's id.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .copied()
            .ok_or_else(|| unauthorized("Authentication required"))
    }
}
