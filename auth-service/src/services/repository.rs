use async_trait::async_trait;
use chrono::{DateTime, Utc};
use service_core::auth::Role;
use service_core::error::AppError;
use sqlx::FromRow;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use super::error::AuthError;
use crate::models::{NewUser, RoleRecord, UserAccount};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_role(&self, id: i64) -> Result<Option<RoleRecord>, AuthError>;

    async fn username_taken(&self, username: &str) -> Result<bool, AuthError>;

    /// Fails with `UsernameExists` when the username is already stored.
    async fn insert(&self, user: NewUser) -> Result<UserAccount, AuthError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, AuthError>;

    async fn ping(&self) -> Result<(), AuthError>;
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    enabled: bool,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct RoleRow {
    id: i64,
    name: String,
}

impl RoleRow {
    /// Rows outside the known role set are skipped rather than failing the load.
    fn into_record(self) -> Option<RoleRecord> {
        match self.name.parse::<Role>() {
            Ok(role) => Some(RoleRecord { id: self.id, role }),
            Err(_) => {
                warn!(role_id = self.id, name = %self.name, "Ignoring unknown role");
                None
            }
        }
    }
}

impl UserRow {
    fn with_roles(self, roles: Vec<RoleRecord>) -> UserAccount {
        UserAccount {
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
            enabled: self.enabled,
            created_at: self.created_at,
            roles,
        }
    }
}

const USER_COLUMNS: &str = "id, username, password_hash, enabled, created_at";

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    #[instrument(skip(database_url), fields(service = "auth-service"))]
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(max_connections, min_connections, "Connecting to PostgreSQL");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        Ok(Self { pool })
    }

    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    async fn roles_of(&self, user_id: i64) -> Result<Vec<RoleRecord>, AuthError> {
        let rows = sqlx::query_as::<_, RoleRow>(
            "SELECT r.id, r.name FROM roles r \
             JOIN user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1 ORDER BY r.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(RoleRow::into_record).collect())
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_role(&self, id: i64) -> Result<Option<RoleRecord>, AuthError> {
        let row = sqlx::query_as::<_, RoleRow>("SELECT id, name FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.and_then(RoleRow::into_record))
    }

    #[instrument(skip(self))]
    async fn username_taken(&self, username: &str) -> Result<bool, AuthError> {
        Ok(
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    #[instrument(skip(self, user), fields(username = %user.username, role_id = user.role_id))]
    async fn insert(&self, user: NewUser) -> Result<UserAccount, AuthError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AuthError::UsernameExists
            }
            other => AuthError::Database(other),
        })?;

        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
            .bind(row.id)
            .bind(user.role_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let roles = self.roles_of(row.id).await?;
        Ok(row.with_roles(roles))
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let roles = self.roles_of(row.id).await?;
                Ok(Some(row.with_roles(roles)))
            }
            None => Ok(None),
        }
    }

    async fn ping(&self) -> Result<(), AuthError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Seeded with the same roles as the migration: `1 = ADMIN`, `2 = USER`.
#[derive(Clone)]
pub struct InMemoryUserRepository {
    roles: Arc<HashMap<i64, Role>>,
    users: Arc<RwLock<Vec<UserAccount>>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self {
            roles: Arc::new(HashMap::from([(1, Role::Admin), (2, Role::User)])),
            users: Arc::default(),
        }
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_enabled(&self, username: &str, enabled: bool) {
        if let Some(user) = self
            .users
            .write()
            .await
            .iter_mut()
            .find(|u| u.username == username)
        {
            user.enabled = enabled;
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_role(&self, id: i64) -> Result<Option<RoleRecord>, AuthError> {
        Ok(self.roles.get(&id).map(|role| RoleRecord { id, role: *role }))
    }

    async fn username_taken(&self, username: &str) -> Result<bool, AuthError> {
        Ok(self.users.read().await.iter().any(|u| u.username == username))
    }

    async fn insert(&self, user: NewUser) -> Result<UserAccount, AuthError> {
        let role = self
            .find_role(user.role_id)
            .await?
            .ok_or(AuthError::RoleNotFound)?;

        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == user.username) {
            return Err(AuthError::UsernameExists);
        }
        let stored = UserAccount {
            id: users.len() as i64 + 1,
            username: user.username,
            password_hash: user.password_hash,
            enabled: true,
            created_at: Utc::now(),
            roles: vec![role],
        };
        users.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, AuthError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn ping(&self) -> Result<(), AuthError> {
        Ok(())
    }
}
