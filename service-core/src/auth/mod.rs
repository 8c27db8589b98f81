//! Caller identity, role-based route policy and bearer tokens.
pub mod identity;
pub mod jwt;
pub mod policy;

pub use identity::{CallerIdentity, ROLES_HEADER, Role, USER_HEADER};
pub use jwt::{JwtService, TokenClaims};
pub use policy::{AccessDenied, AccessPolicy, PolicyTable, STAFF, back_office_policy};
