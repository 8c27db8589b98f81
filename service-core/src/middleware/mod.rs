pub mod authorize;
pub mod metrics;
pub mod rate_limit;
pub mod security_headers;
pub mod tracing;

pub use authorize::authorize_middleware;
pub use metrics::metrics_middleware;
pub use rate_limit::{IpRateLimiter, create_ip_rate_limiter, ip_rate_limit_middleware};
pub use security_headers::security_headers_middleware;
pub use tracing::{http_trace_layer, request_id_middleware};

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
};
use std::sync::Arc;

use crate::auth::PolicyTable;

/// Wraps a domain service router: request id, security headers, trace span,
/// HTTP metrics, then the access policy closest to the handlers.
pub fn with_service_layers(router: Router, policy: PolicyTable) -> Router {
    router
        .layer(from_fn_with_state(Arc::new(policy), authorize_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(http_trace_layer())
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
}
