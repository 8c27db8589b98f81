use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use service_core::observability::get_metrics;

use crate::startup::AppState;

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "inventory-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Only the movement store is checked; product-service has its own probe.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.inventory.ping().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
