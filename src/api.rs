//! Status HTTP endpoint.
//!
//! - `GET /health`
//! - `GET /targets/{id}/status?owner={owner_id}`

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use fleetwatch_monitor::{ProberError, StatusService};
use fleetwatch_protocols::{RepositoryError, StatusSnapshot};

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;

/// Shared handler state.
#[derive(Clone)]
pub(crate) struct ApiState {
    pub status: Arc<StatusService>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwnerQuery {
    pub owner: i64,
}

/// Maps lookup failures to HTTP responses without leaking internals.
pub(crate) struct ApiError(ProberError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ProberError::Repository(RepositoryError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "Status not found".to_string())
            }
            ProberError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()),
            other => {
                error!(error = %other, "Status lookup failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub(crate) fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/targets/{id}/status", get(target_status))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn target_status(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<StatusSnapshot>, ApiError> {
    state
        .status
        .get_status(id, query.owner)
        .await
        .map(Json)
        .map_err(ApiError)
}
