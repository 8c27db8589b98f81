pub mod error;
pub mod ledger;
pub mod metrics;
pub mod products;
pub mod repository;

pub use error::InventoryError;
pub use ledger::InventoryService;
pub use products::ProductGateway;
pub use repository::{InMemoryMovementRepository, MovementRepository, PgMovementRepository};
