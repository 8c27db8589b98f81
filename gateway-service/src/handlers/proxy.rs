use axum::{extract::Request, extract::State, response::Response};
use service_core::auth::CallerIdentity;
use service_core::error::AppError;
use service_core::observability::extract_request_id;

use crate::startup::AppState;

pub async fn proxy_request(
    State(state): State<AppState>,
    req: Request,
) -> Result<Response, AppError> {
    let identity = req.extensions().get::<CallerIdentity>().cloned();
    let request_id = extract_request_id(req.headers());

    let response = state
        .proxy
        .forward(identity.as_ref(), request_id.as_deref(), req)
        .await?;
    Ok(response)
}
