use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use service_core::observability::get_metrics;

use crate::startup::AppState;

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "gateway-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Ready once at least one upstream route is configured. Upstreams are not probed.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.proxy.routes().is_empty() {
        tracing::warn!("Readiness check failed: no upstream routes");
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
