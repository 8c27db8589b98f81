pub mod user;

pub use user::{NewUser, RoleRecord, UserAccount};
