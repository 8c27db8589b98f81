use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use service_core::clients::CallContext;
use service_core::error::AppError;
use service_core::pagination::{Page, Paging};
use service_core::utils::JsonBody;

use crate::dtos::{SaleRequest, SaleResponse};
use crate::startup::AppState;

pub async fn register_sale(
    State(state): State<AppState>,
    ctx: CallContext,
    JsonBody(request): JsonBody<SaleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let recorded = state.sales.register_sale(&ctx, &request).await?;
    Ok((StatusCode::CREATED, Json(SaleResponse::from(recorded))))
}

pub async fn list_sales(
    State(state): State<AppState>,
    ctx: CallContext,
    Query(paging): Query<Paging>,
) -> Result<Json<Page<SaleResponse>>, AppError> {
    let page = state.sales.list_sales(&ctx, &paging).await?;
    Ok(Json(page.map(SaleResponse::from)))
}

pub async fn list_sales_by_client(
    State(state): State<AppState>,
    ctx: CallContext,
    Path(client_id): Path<i64>,
    JsonBody(paging): JsonBody<Paging>,
) -> Result<Json<Page<SaleResponse>>, AppError> {
    let page = state
        .sales
        .list_sales_by_client(&ctx, client_id, &paging)
        .await?;
    Ok(Json(page.map(SaleResponse::from)))
}
