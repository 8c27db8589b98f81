use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::UserAccount;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(length(max = 100, message = "Username is too long"))]
    pub username: Option<String>,
    pub password: Option<Secret<String>>,
    pub role_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<Secret<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub username: String,
    pub message: String,
    pub jwt: String,
    pub status: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub roles: Vec<RoleResponse>,
}

impl From<UserAccount> for UserResponse {
    fn from(user: UserAccount) -> Self {
        Self {
            id: user.id,
            username: user.username,
            enabled: user.enabled,
            created_at: user.created_at,
            roles: user
                .roles
                .into_iter()
                .map(|r| RoleResponse {
                    id: r.id,
                    name: r.role.as_str().to_string(),
                })
                .collect(),
        }
    }
}
