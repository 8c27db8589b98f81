use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::pagination::SortKeys;

/// `total` is stored as a decimal string, so it is not offered as a sort key.
pub const SALE_SORT_KEYS: SortKeys = &[
    ("id", "_id"),
    ("clientId", "client_id"),
    ("date", "date"),
];

/// A sale document. Sales are written once and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub client_id: i64,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,
    pub total: Decimal,
    pub details: Vec<SaleDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleDetail {
    pub product_id: i64,
    pub quantity: i64,
    /// Product price captured when the sale was made.
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

impl SaleDetail {
    /// Returns `None` when the subtotal does not fit in a `Decimal`.
    pub fn priced(product_id: i64, quantity: i64, unit_price: Decimal) -> Option<Self> {
        let subtotal = unit_price.checked_mul(Decimal::from(quantity))?;
        Some(Self {
            product_id,
            quantity,
            unit_price,
            subtotal,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewSale {
    pub client_id: i64,
    pub date: DateTime<Utc>,
    pub total: Decimal,
    pub details: Vec<SaleDetail>,
}

impl NewSale {
    /// Returns `None` when the sum of the subtotals overflows.
    pub fn new(client_id: i64, date: DateTime<Utc>, details: Vec<SaleDetail>) -> Option<Self> {
        let total = details
            .iter()
            .try_fold(Decimal::ZERO, |acc, d| acc.checked_add(d.subtotal))?;
        Some(Self {
            client_id,
            date,
            total,
            details,
        })
    }

    pub fn into_sale(self, id: ObjectId) -> Sale {
        Sale {
            id,
            client_id: self.client_id,
            date: self.date,
            total: self.total,
            details: self.details,
        }
    }
}

/// A sale together with the full name of the client it was made to.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSale {
    pub sale: Sale,
    pub client: String,
}
