pub mod error;
pub mod metrics;
pub mod proxy;

pub use error::GatewayError;
pub use proxy::Proxy;
