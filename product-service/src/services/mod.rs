pub mod catalog;
pub mod error;
pub mod metrics;
pub mod repository;

pub use catalog::ProductService;
pub use error::ProductError;
pub use repository::{InMemoryProductRepository, PgProductRepository, ProductRepository};
