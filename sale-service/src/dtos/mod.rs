use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{RecordedSale, SaleDetail};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    pub client_id: Option<i64>,
    pub details: Option<Vec<SaleDetailRequest>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetailRequest {
    pub product_id: Option<i64>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    pub id: String,
    /// Client full name.
    pub client: String,
    pub date: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub details: Vec<SaleDetailResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetailResponse {
    pub product_id: i64,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
}

impl From<SaleDetail> for SaleDetailResponse {
    fn from(d: SaleDetail) -> Self {
        Self {
            product_id: d.product_id,
            quantity: d.quantity,
            unit_price: d.unit_price,
            subtotal: d.subtotal,
        }
    }
}

impl From<RecordedSale> for SaleResponse {
    fn from(recorded: RecordedSale) -> Self {
        let sale = recorded.sale;
        Self {
            id: sale.id.to_hex(),
            client: recorded.client,
            date: sale.date,
            total: sale.total,
            details: sale.details.into_iter().map(Into::into).collect(),
        }
    }
}
