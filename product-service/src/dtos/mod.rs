use rust_decimal::Decimal;
use serde::Deserialize;

pub use service_core::clients::ProductResponse;

/// Body of create and update requests. Missing fields fail domain validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
}
