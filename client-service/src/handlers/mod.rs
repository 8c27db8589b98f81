pub mod clients;
pub mod health;

pub use clients::{create_client, get_client, get_client_by_document, list_clients};
pub use health::{health_check, metrics_endpoint, readiness_check};
