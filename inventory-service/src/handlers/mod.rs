pub mod health;
pub mod movements;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use movements::{list_movements, register_movement};
