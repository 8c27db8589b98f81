use async_trait::async_trait;
use service_core::error::AppError;
use service_core::pagination::PageRequest;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{info, instrument};

use super::error::ClientError;
use super::metrics::record_db_query;
use crate::models::{Client, NewClient};

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn insert(&self, client: NewClient) -> Result<Client, ClientError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Client>, ClientError>;

    async fn find_by_document(&self, document_number: &str) -> Result<Option<Client>, ClientError>;

    async fn document_exists(&self, document_number: &str) -> Result<bool, ClientError>;

    async fn list(&self, page: &PageRequest) -> Result<(Vec<Client>, u64), ClientError>;

    async fn ping(&self) -> Result<(), ClientError>;
}

const CLIENT_COLUMNS: &str =
    "id, given_name, family_name, document_type, document_number, birth_date";

#[derive(Clone)]
pub struct PgClientRepository {
    pool: PgPool,
}

impl PgClientRepository {
    #[instrument(skip(database_url), fields(service = "client-service"))]
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
}

#[async_trait]
impl ClientRepository for PgClientRepository {
    #[instrument(skip(self, client), fields(document_type = %client.document_type))]
    async fn insert(&self, client: NewClient) -> Result<Client, ClientError> {
        let start = Instant::now();
        let result = sqlx::query_as::<_, Client>(&format!(
            "INSERT INTO clients (given_name, family_name, document_type, document_number, birth_date) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {CLIENT_COLUMNS}"
        ))
        .bind(&client.given_name)
        .bind(&client.family_name)
        .bind(client.document_type.as_str())
        .bind(&client.document_number)
        .bind(client.birth_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                ClientError::DocumentNumberExists
            }
            other => ClientError::Database(other),
        });
        record_db_query("insert_client", start.elapsed());
        result
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<Client>, ClientError> {
        let start = Instant::now();
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        record_db_query("find_client", start.elapsed());
        Ok(client)
    }

    #[instrument(skip(self))]
    async fn find_by_document(&self, document_number: &str) -> Result<Option<Client>, ClientError> {
        Ok(sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE document_number = $1"
        ))
        .bind(document_number)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn document_exists(&self, document_number: &str) -> Result<bool, ClientError> {
        Ok(
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE document_number = $1)")
                .bind(document_number)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    #[instrument(skip(self))]
    async fn list(&self, page: &PageRequest) -> Result<(Vec<Client>, u64), ClientError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await?;

        let clients = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY {} DESC, id DESC LIMIT $1 OFFSET $2",
            page.sort_column
        ))
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok((clients, total.max(0) as u64))
    }

    async fn ping(&self) -> Result<(), ClientError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryClientRepository {
    inner: Arc<RwLock<Vec<Client>>>,
}

impl InMemoryClientRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare_desc(column: &str, a: &Client, b: &Client) -> Ordering {
    let primary = match column {
        "given_name" => b.given_name.cmp(&a.given_name),
        "family_name" => b.family_name.cmp(&a.family_name),
        "document_number" => b.document_number.cmp(&a.document_number),
        "birth_date" => b.birth_date.cmp(&a.birth_date),
        _ => Ordering::Equal,
    };
    primary.then_with(|| b.id.cmp(&a.id))
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn insert(&self, client: NewClient) -> Result<Client, ClientError> {
        let mut clients = self.inner.write().await;
        if clients
            .iter()
            .any(|c| c.document_number == client.document_number)
        {
            return Err(ClientError::DocumentNumberExists);
        }
        let stored = Client {
            id: clients.len() as i64 + 1,
            given_name: client.given_name,
            family_name: client.family_name,
            document_type: client.document_type.as_str().to_string(),
            document_number: client.document_number,
            birth_date: client.birth_date,
        };
        clients.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Client>, ClientError> {
        Ok(self.inner.read().await.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_document(&self, document_number: &str) -> Result<Option<Client>, ClientError> {
        Ok(self
            .inner
            .read()
            .await
            .iter()
            .find(|c| c.document_number == document_number)
            .cloned())
    }

    async fn document_exists(&self, document_number: &str) -> Result<bool, ClientError> {
        Ok(self.find_by_document(document_number).await?.is_some())
    }

    async fn list(&self, page: &PageRequest) -> Result<(Vec<Client>, u64), ClientError> {
        let mut all = self.inner.read().await.clone();
        all.sort_by(|a, b| compare_desc(page.sort_column, a, b));
        let total = all.len() as u64;
        Ok((page.slice(&all), total))
    }

    async fn ping(&self) -> Result<(), ClientError> {
        Ok(())
    }
}
