use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::AppError;

/// Header carrying the authenticated username, set by the gateway.
pub const USER_HEADER: &str = "user";
/// Header carrying the caller's authorities, comma separated (`ROLE_ADMIN,ROLE_USER`).
pub const ROLES_HEADER: &str = "roles";

const AUTHORITY_PREFIX: &str = "ROLE_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }

    /// The granted-authority form, e.g. `ROLE_ADMIN`.
    pub fn authority(&self) -> String {
        format!("{}{}", AUTHORITY_PREFIX, self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    /// Accepts `ADMIN` as well as `ROLE_ADMIN`, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix(AUTHORITY_PREFIX).unwrap_or(&upper);
        match name {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Who is calling, as established by the gateway from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub username: String,
    pub roles: Vec<Role>,
}

impl CallerIdentity {
    pub fn new(username: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            username: username.into(),
            roles,
        }
    }

    pub fn has_any_role(&self, allowed: &[Role]) -> bool {
        self.roles.iter().any(|r| allowed.contains(r))
    }

    pub fn roles_header(&self) -> String {
        join_authorities(&self.roles)
    }

    /// Reads `user` and `roles`. Unknown authorities (plain permissions) are skipped.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let username = headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())?;

        let roles = headers
            .get(ROLES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(parse_authorities)
            .unwrap_or_default();

        Some(Self::new(username, roles))
    }
}

pub fn join_authorities(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::authority)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn parse_authorities(raw: &str) -> Vec<Role> {
    let mut roles: Vec<Role> = Vec::new();
    for role in raw.split(',').filter_map(|s| s.parse::<Role>().ok()) {
        if !roles.contains(&role) {
            roles.push(role);
        }
    }
    roles
}

#[async_trait]
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<CallerIdentity>() {
            return Ok(identity.clone());
        }

        CallerIdentity::from_headers(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Unauthorized")))
    }
}
