use chrono::NaiveDate;
use rust_decimal::Decimal;
use service_core::clients::ProductResponse;
use service_core::pagination::SortKeys;
use sqlx::FromRow;

/// Fields `orderBy` may name when listing products.
pub const PRODUCT_SORT_KEYS: SortKeys = &[
    ("id", "id"),
    ("name", "name"),
    ("price", "price"),
    ("stock", "stock"),
    ("createdAt", "created_at"),
];

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub active: bool,
    pub created_at: NaiveDate,
    pub stock: i64,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            active: p.active,
            created_at: p.created_at,
            stock: p.stock,
        }
    }
}

/// A validated catalog entry about to be stored. New products start with no stock.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub created_at: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct ProductChanges {
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

/// Outcome of a conditional stock change.
#[derive(Debug, Clone, PartialEq)]
pub enum StockUpdate {
    Applied(Product),
    Insufficient,
    /// The new level would not fit in the stock column.
    Overflow,
    Missing,
}
