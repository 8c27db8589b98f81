pub mod accounts;
pub mod error;
pub mod metrics;
pub mod repository;

pub use accounts::AccountService;
pub use error::AuthError;
pub use repository::{InMemoryUserRepository, PgUserRepository, UserRepository};
