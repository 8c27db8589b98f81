pub mod health;
pub mod proxy;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use proxy::proxy_request;
