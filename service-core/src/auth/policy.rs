use http::Method;
use thiserror::Error;

use super::identity::{CallerIdentity, Role};
use crate::error::AppError;

/// Roles allowed on every back-office business route.
pub const STAFF: &[Role] = &[Role::Admin, Role::User];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    Public,
    Authenticated,
    AnyRole(&'static [Role]),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("Unauthorized")]
    MissingIdentity,
    #[error("Access denied")]
    RoleNotAllowed,
}

impl From<AccessDenied> for AppError {
    fn from(err: AccessDenied) -> Self {
        match err {
            AccessDenied::MissingIdentity => AppError::Unauthorized(anyhow::Error::new(err)),
            AccessDenied::RoleNotAllowed => AppError::Forbidden(anyhow::Error::new(err)),
        }
    }
}

#[derive(Debug, Clone)]
struct RouteRule {
    method: Option<Method>,
    prefix: &'static str,
    policy: AccessPolicy,
}

/// Route-prefix table consulted before a request reaches its handler.
///
/// The longest matching prefix wins; method-specific rules beat method-less
/// ones of equal length.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    rules: Vec<RouteRule>,
    fallback: AccessPolicy,
}

impl PolicyTable {
    pub fn new(fallback: AccessPolicy) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    pub fn rule(mut self, prefix: &'static str, policy: AccessPolicy) -> Self {
        self.rules.push(RouteRule {
            method: None,
            prefix,
            policy,
        });
        self
    }

    pub fn method_rule(mut self, method: Method, prefix: &'static str, policy: AccessPolicy) -> Self {
        self.rules.push(RouteRule {
            method: Some(method),
            prefix,
            policy,
        });
        self
    }

    pub fn resolve(&self, method: &Method, path: &str) -> AccessPolicy {
        self.rules
            .iter()
            .filter(|r| r.method.as_ref().is_none_or(|m| m == method))
            .filter(|r| prefix_matches(r.prefix, path))
            .max_by_key(|r| (r.prefix.len(), r.method.is_some()))
            .map(|r| r.policy)
            .unwrap_or(self.fallback)
    }

    pub fn check(
        &self,
        method: &Method,
        path: &str,
        identity: Option<&CallerIdentity>,
    ) -> Result<(), AccessDenied> {
        match self.resolve(method, path) {
            AccessPolicy::Public => Ok(()),
            AccessPolicy::Authenticated => identity.map(|_| ()).ok_or(AccessDenied::MissingIdentity),
            AccessPolicy::AnyRole(roles) => {
                let identity = identity.ok_or(AccessDenied::MissingIdentity)?;
                if identity.has_any_role(roles) {
                    Ok(())
                } else {
                    Err(AccessDenied::RoleNotAllowed)
                }
            }
        }
    }
}

fn prefix_matches(prefix: &str, path: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Operational endpoints and auth are public; every business route needs staff.
pub fn back_office_policy() -> PolicyTable {
    PolicyTable::new(AccessPolicy::AnyRole(STAFF))
        .rule("/health", AccessPolicy::Public)
        .rule("/ready", AccessPolicy::Public)
        .rule("/metrics", AccessPolicy::Public)
        .rule("/api/auth", AccessPolicy::Public)
}
