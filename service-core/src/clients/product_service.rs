use chrono::NaiveDate;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CallContext, ClientCallError, MovementKind, ServiceClientConfig, read_json};
use crate::observability::TracedClientExt;

const SERVICE: &str = "product-service";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub active: bool,
    pub created_at: NaiveDate,
    pub stock: i64,
}

#[derive(Clone)]
pub struct ProductServiceClient {
    http: reqwest::Client,
    config: ServiceClientConfig,
}

impl ProductServiceClient {
    pub fn new(config: ServiceClientConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: config.build_http()?,
            config,
        })
    }

    /// `None` when product-service answers 404.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn find_product(
        &self,
        ctx: &CallContext,
        id: i64,
    ) -> Result<Option<ProductResponse>, ClientCallError> {
        let url = self.config.url(&format!("/api/products/{}", id));
        let response = ctx
            .apply(self.http.traced_get(&url))
            .send()
            .await
            .map_err(ClientCallError::transport(SERVICE))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(SERVICE, response).await.map(Some)
    }

    /// Applies a stock delta and returns the product with its new stock.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn update_stock(
        &self,
        ctx: &CallContext,
        id: i64,
        quantity: i64,
        kind: MovementKind,
    ) -> Result<ProductResponse, ClientCallError> {
        let url = self.config.url(&format!(
            "/api/products/stock/{}/{}/{}",
            id,
            quantity,
            kind.as_str()
        ));
        let response = ctx
            .apply(self.http.traced_put(&url))
            .send()
            .await
            .map_err(ClientCallError::transport(SERVICE))?;

        read_json(SERVICE, response).await
    }
}
