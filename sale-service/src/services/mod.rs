pub mod collaborators;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod repository;

pub use collaborators::{ClientLookup, ProductLookup, StockDebit};
pub use error::SaleError;
pub use orchestrator::SaleService;
pub use repository::{InMemorySaleRepository, MongoSaleRepository, SaleRepository};
