//! System endpoints: health check.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
///
/// Reaching this handler already implies the store was acquired and the
/// schema exists; startup never binds the listener otherwise.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    /// `"connected"` when a cache handle is held, `"disabled"` otherwise.
    cache: &'static str,
    timestamp: String,
    version: &'static str,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service status, cache acquisition state, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is serving", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        cache: if state.cache.is_some() {
            "connected"
        } else {
            "disabled"
        },
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
