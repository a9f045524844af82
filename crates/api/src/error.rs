//! Error boundary between the services and HTTP clients.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use neutron_shared::AppError;
use serde_json::json;
use tracing::{error, warn};

/// Renders any service failure as `{ "error": <code>, "message": <public message> }`.
///
/// Server-side failures are logged with their detail; caller-side failures
/// only at `warn` since the detail never leaves the process.
pub fn error_response(err: impl Into<AppError>) -> Response {
    let err = err.into();
    match &err {
        AppError::Database(_) | AppError::ExternalService(_) | AppError::Internal(_) => {
            error!(error = %err, "Request failed");
        }
        AppError::Unauthorized(_) | AppError::OperationFailed(_) => {
            warn!(error = %err, "Request rejected");
        }
    }

    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.public_message(),
        })),
    )
        .into_response()
}

/// Rejects malformed caller input with the same body as any other failed operation.
pub fn bad_request(detail: impl Into<String>) -> Response {
    error_response(AppError::OperationFailed(detail.into()))
}
