pub mod auth;
pub mod health;

pub use auth::{log_in, sign_up};
pub use health::{health_check, metrics_endpoint, readiness_check};
