use chrono::{DateTime, Utc};
use service_core::auth::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRecord {
    pub id: i64,
    pub role: Role,
}

/// A stored user with the roles granted to them.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub roles: Vec<RoleRecord>,
}

impl UserAccount {
    pub fn role_names(&self) -> Vec<Role> {
        self.roles.iter().map(|r| r.role).collect()
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role_id: i64,
}
