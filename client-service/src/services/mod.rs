pub mod error;
pub mod metrics;
pub mod registry;
pub mod repository;

pub use error::ClientError;
pub use registry::ClientService;
pub use repository::{ClientRepository, InMemoryClientRepository, PgClientRepository};
