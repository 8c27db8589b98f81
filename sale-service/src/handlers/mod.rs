pub mod health;
pub mod sales;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use sales::{list_sales, list_sales_by_client, register_sale};
