use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use service_core::clients::{CallContext, MovementResponse};
use service_core::error::AppError;
use service_core::pagination::{Page, Paging};
use service_core::utils::JsonBody;

use crate::models::MovementRequest;
use crate::startup::AppState;

pub async fn register_movement(
    State(state): State<AppState>,
    ctx: CallContext,
    JsonBody(request): JsonBody<MovementRequest>,
) -> Result<impl IntoResponse, AppError> {
    let movement = state.inventory.register_movement(&ctx, &request).await?;
    Ok((StatusCode::CREATED, Json(MovementResponse::from(movement))))
}

pub async fn list_movements(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    JsonBody(paging): JsonBody<Paging>,
) -> Result<Json<Page<MovementResponse>>, AppError> {
    let page = state.inventory.list_movements(product_id, &paging).await?;
    Ok(Json(page.map(MovementResponse::from)))
}
