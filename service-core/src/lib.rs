//! service-core: Shared infrastructure for the back-office microservices.
pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
pub mod pagination;
pub mod utils;

pub use async_trait;
pub use axum;
pub use mongodb;
pub use serde;
pub use serde_json;
pub use sqlx;
pub use tokio;
pub use tower;
pub use tower_http;
pub use tracing;
pub use validator;
