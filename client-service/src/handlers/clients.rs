use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use service_core::error::AppError;
use service_core::pagination::{Page, Paging};
use service_core::utils::JsonBody;

use crate::dtos::{ClientRequest, ClientResponse};
use crate::startup::AppState;

pub async fn create_client(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ClientRequest>,
) -> Result<impl IntoResponse, AppError> {
    let client = state.clients.add_client(&request).await?;
    Ok((StatusCode::CREATED, Json(ClientResponse::from(client))))
}

pub async fn list_clients(
    State(state): State<AppState>,
    Query(paging): Query<Paging>,
) -> Result<Json<Page<ClientResponse>>, AppError> {
    let page = state.clients.list_clients(&paging).await?;
    Ok(Json(page.map(ClientResponse::from)))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ClientResponse>, AppError> {
    Ok(Json(state.clients.get_client(id).await?.into()))
}

pub async fn get_client_by_document(
    State(state): State<AppState>,
    Path((document_number, document_type)): Path<(String, String)>,
) -> Result<Json<ClientResponse>, AppError> {
    let client = state
        .clients
        .get_by_document(&document_number, &document_type)
        .await?;
    Ok(Json(client.into()))
}
