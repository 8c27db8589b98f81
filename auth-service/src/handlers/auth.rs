use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use service_core::error::AppError;
use service_core::utils::{JsonBody, ValidatedJson};

use crate::dtos::{LoginRequest, LoginResponse, SignUpRequest, UserResponse};
use crate::startup::AppState;

pub async fn sign_up(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SignUpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.accounts.register(&request).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn log_in(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(state.accounts.login(&request).await?))
}
