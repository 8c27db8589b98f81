use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use service_core::auth::{
    AccessPolicy, CallerIdentity, JwtService, PolicyTable, ROLES_HEADER, USER_HEADER,
};
use service_core::error::AppError;
use std::sync::Arc;

use crate::services::GatewayError;
use crate::services::metrics::record_rejected;

/// Turns a bearer token into the caller identity the services trust.
pub struct Authenticator {
    jwt: JwtService,
    policy: PolicyTable,
}

impl Authenticator {
    pub fn new(jwt: JwtService, policy: PolicyTable) -> Self {
        Self { jwt, policy }
    }

    pub fn identify(&self, headers: &HeaderMap) -> Result<CallerIdentity, GatewayError> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(GatewayError::MissingToken)?;

        let claims = self.jwt.validate(token).map_err(GatewayError::InvalidToken)?;
        Ok(claims.identity())
    }
}

/// Identity headers from the outside are never trusted: they are dropped
/// before the policy runs and re-derived from the token.
pub async fn authenticate_middleware(
    State(auth): State<Arc<Authenticator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    req.headers_mut().remove(USER_HEADER);
    req.headers_mut().remove(ROLES_HEADER);

    if auth.policy.resolve(req.method(), req.uri().path()) == AccessPolicy::Public {
        return Ok(next.run(req).await);
    }

    let identity = auth.identify(req.headers()).map_err(|e| {
        record_rejected("token");
        tracing::debug!(path = %req.uri().path(), error = %e, "Rejected request without valid token");
        AppError::from(e)
    })?;

    if let Err(denied) = auth
        .policy
        .check(req.method(), req.uri().path(), Some(&identity))
    {
        record_rejected("role");
        return Err(denied.into());
    }

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
