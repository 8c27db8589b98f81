pub mod authenticate;

pub use authenticate::{Authenticator, authenticate_middleware};
