use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{CallerIdentity, PolicyTable};
use crate::error::AppError;

/// Enforces the route policy table and exposes the caller as a request extension.
pub async fn authorize_middleware(
    State(policy): State<Arc<PolicyTable>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = CallerIdentity::from_headers(req.headers());

    if let Err(denied) = policy.check(req.method(), req.uri().path(), identity.as_ref()) {
        tracing::debug!(
            method = %req.method(),
            path = %req.uri().path(),
            reason = %denied,
            "Request rejected by access policy"
        );
        return Err(denied.into());
    }

    if let Some(identity) = identity {
        req.extensions_mut().insert(identity);
    }

    Ok(next.run(req).await)
}
