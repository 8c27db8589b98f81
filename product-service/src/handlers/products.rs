use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use service_core::error::AppError;
use service_core::pagination::{Page, Paging};
use service_core::utils::JsonBody;

use crate::dtos::{ProductRequest, ProductResponse};
use crate::startup::AppState;

pub async fn create_product(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.products.add_product(&request).await?;
    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(paging): Query<Paging>,
) -> Result<Json<Page<ProductResponse>>, AppError> {
    let page = state.products.list_products(&paging).await?;
    Ok(Json(page.map(ProductResponse::from)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state.products.get_product(id).await?;
    Ok(Json(product.into()))
}

pub async fn search_products(
    State(state): State<AppState>,
    Path(name): Path<String>,
    JsonBody(paging): JsonBody<Paging>,
) -> Result<Json<Page<ProductResponse>>, AppError> {
    let page = state.products.search_by_name(&name, &paging).await?;
    Ok(Json(page.map(ProductResponse::from)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(request): JsonBody<ProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state.products.update_product(id, &request).await?;
    Ok(Json(product.into()))
}

pub async fn update_stock(
    State(state): State<AppState>,
    Path((id, quantity, movement_type)): Path<(i64, i64, String)>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state
        .products
        .update_stock(id, quantity, &movement_type)
        .await?;
    Ok(Json(product.into()))
}
