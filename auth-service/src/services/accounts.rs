use secrecy::{ExposeSecret, Secret};
use service_core::auth::JwtService;
use service_core::utils::{is_blank, is_not_positive};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::error::AuthError;
use super::metrics::{record_login, record_registration};
use super::repository::UserRepository;
use crate::dtos::{LoginRequest, LoginResponse, SignUpRequest};
use crate::models::{NewUser, UserAccount};
use crate::utils::{hash_password, verify_password};

const LOGIN_MESSAGE: &str = "User logged in";

#[derive(Clone)]
pub struct AccountService {
    repo: Arc<dyn UserRepository>,
    jwt: JwtService,
}

fn required_username(raw: Option<&str>) -> Result<String, AuthError> {
    if is_blank(raw) {
        return Err(AuthError::UsernameEmpty);
    }
    Ok(raw.unwrap_or_default().trim().to_string())
}

fn required_password(raw: Option<&Secret<String>>) -> Result<&Secret<String>, AuthError> {
    raw.filter(|p| !is_blank(Some(p.expose_secret().as_str())))
        .ok_or(AuthError::PasswordEmpty)
}

impl AccountService {
    pub fn new(repo: Arc<dyn UserRepository>, jwt: JwtService) -> Self {
        Self { repo, jwt }
    }

    #[instrument(skip(self, request), fields(username = ?request.username, role_id = ?request.role_id))]
    pub async fn register(&self, request: &SignUpRequest) -> Result<UserAccount, AuthError> {
        let username = required_username(request.username.as_deref())?;
        let password = required_password(request.password.as_ref())?;
        if is_not_positive(request.role_id) {
            return Err(AuthError::InvalidId);
        }
        let role_id = request.role_id.unwrap_or_default();

        self.repo
            .find_role(role_id)
            .await?
            .ok_or(AuthError::RoleNotFound)?;
        if self.repo.username_taken(&username).await? {
            return Err(AuthError::UsernameExists);
        }

        let user = self
            .repo
            .insert(NewUser {
                username,
                password_hash: hash_password(password)?,
                role_id,
            })
            .await?;

        record_registration();
        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Unknown users, disabled users and wrong passwords all fail the same way.
    #[instrument(skip(self, request), fields(username = ?request.username))]
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        let username = required_username(request.username.as_deref())?;
        let password = required_password(request.password.as_ref())?;

        let result = self.authenticate(&username, password).await;
        match &result {
            Ok(_) => record_login("success"),
            Err(AuthError::InvalidCredentials) => {
                record_login("invalid_credentials");
                warn!("Login rejected");
            }
            Err(_) => record_login("error"),
        }
        let user = result?;

        let jwt = self.jwt.issue(&user.username, &user.role_names())?;
        info!(user_id = user.id, "User logged in");

        Ok(LoginResponse {
            username: user.username,
            message: LOGIN_MESSAGE.to_string(),
            jwt,
            status: true,
        })
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &Secret<String>,
    ) -> Result<UserAccount, AuthError> {
        let user = self
            .repo
            .find_by_username(username)
            .await?
            .filter(|u| u.enabled)
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(user)
    }

    pub async fn ping(&self) -> Result<(), AuthError> {
        self.repo.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryUserRepository;
    use service_core::auth::Role;

    fn service() -> (AccountService, InMemoryUserRepository) {
        let repo = InMemoryUserRepository::new();
        let jwt = JwtService::new("test-secret", "retail-back-office", 30);
        (AccountService::new(Arc::new(repo.clone()), jwt), repo)
    }

    fn sign_up(username: &str, password: &str, role_id: i64) -> SignUpRequest {
        SignUpRequest {
            username: Some(username.to_string()),
            password: Some(Secret::new(password.to_string())),
            role_id: Some(role_id),
        }
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: Some(username.to_string()),
            password: Some(Secret::new(password.to_string())),
        }
    }

    #[tokio::test]
    async fn registered_user_can_log_in_and_token_carries_roles() {
        let (service, _) = service();
        let user = service.register(&sign_up("ana", "pa55word", 1)).await.unwrap();
        assert_eq!(user.role_names(), vec![Role::Admin]);
        assert_ne!(user.password_hash, "pa55word");

        let response = service.login(&login("ana", "pa55word")).await.unwrap();
        assert!(response.status);
        assert_eq!(response.message, "User logged in");

        let claims = JwtService::new("test-secret", "retail-back-office", 30)
            .validate(&response.jwt)
            .unwrap();
        assert_eq!(claims.sub, "ana");
        assert_eq!(claims.authorities, "ROLE_ADMIN");
    }

    #[tokio::test]
    async fn sign_up_checks_run_in_order() {
        let (service, _) = service();

        let blank = SignUpRequest {
            username: Some("  ".into()),
            password: None,
            role_id: None,
        };
        assert!(matches!(
            service.register(&blank).await,
            Err(AuthError::UsernameEmpty)
        ));
        assert!(matches!(
            service.register(&sign_up("ana", "", 1)).await,
            Err(AuthError::PasswordEmpty)
        ));
        assert!(matches!(
            service.register(&sign_up("ana", "pw", 0)).await,
            Err(AuthError::InvalidId)
        ));
        assert!(matches!(
            service.register(&sign_up("ana", "pw", 7)).await,
            Err(AuthError::RoleNotFound)
        ));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let (service, _) = service();
        service.register(&sign_up("ana", "pw", 2)).await.unwrap();

        assert!(matches!(
            service.register(&sign_up("ana", "other", 2)).await,
            Err(AuthError::UsernameExists)
        ));
    }

    #[tokio::test]
    async fn wrong_password_unknown_user_and_disabled_user_are_rejected_alike() {
        let (service, repo) = service();
        service.register(&sign_up("ana", "pw", 2)).await.unwrap();

        assert!(matches!(
            service.login(&login("ana", "nope")).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login(&login("bob", "pw")).await,
            Err(AuthError::InvalidCredentials)
        ));

        repo.set_enabled("ana", false).await;
        assert!(matches!(
            service.login(&login("ana", "pw")).await,
            Err(AuthError::InvalidCredentials)
        ));
    }
}
