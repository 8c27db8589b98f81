use async_trait::async_trait;
use service_core::error::AppError;
use service_core::pagination::PageRequest;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use super::error::InventoryError;
use crate::models::{Movement, NewMovement};

#[async_trait]
pub trait MovementRepository: Send + Sync {
    async fn append(&self, movement: NewMovement) -> Result<Movement, InventoryError>;

    async fn list_for_product(
        &self,
        product_id: i64,
        page: &PageRequest,
    ) -> Result<(Vec<Movement>, u64), InventoryError>;

    async fn ping(&self) -> Result<(), InventoryError>;
}

const MOVEMENT_COLUMNS: &str = "id, product_id, quantity, movement_type, registered_at";

#[derive(Clone)]
pub struct PgMovementRepository {
    pool: PgPool,
}

impl PgMovementRepository {
    #[instrument(skip(database_url), fields(service = "inventory-service"))]
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
impl MovementRepository for PgMovementRepository {
    #[instrument(skip(self, movement), fields(product_id = movement.product_id, kind = %movement.kind))]
    async fn append(&self, movement: NewMovement) -> Result<Movement, InventoryError> {
        Ok(sqlx::query_as::<_, Movement>(&format!(
            "INSERT INTO movements (product_id, quantity, movement_type, registered_at) \
             VALUES ($1, $2, $3, $4) RETURNING {MOVEMENT_COLUMNS}"
        ))
        .bind(movement.product_id)
        .bind(movement.quantity)
        .bind(movement.kind.as_str())
        .bind(movement.registered_at)
        .fetch_one(&self.pool)
        .await?)
    }

    #[instrument(skip(self))]
    async fn list_for_product(
        &self,
        product_id: i64,
        page: &PageRequest,
    ) -> Result<(Vec<Movement>, u64), InventoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movements WHERE product_id = $1")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await?;

        let movements = sqlx::query_as::<_, Movement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM movements WHERE product_id = $1 \
             ORDER BY {} DESC, id DESC LIMIT $2 OFFSET $3",
            page.sort_column
        ))
        .bind(product_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok((movements, total.max(0) as u64))
    }

    async fn ping(&self) -> Result<(), InventoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryMovementRepository {
    inner: Arc<RwLock<Vec<Movement>>>,
}

impl InMemoryMovementRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<Movement> {
        self.inner.read().await.clone()
    }
}

fn compare_desc(column: &str, a: &Movement, b: &Movement) -> Ordering {
    let primary = match column {
        "quantity" => b.quantity.cmp(&a.quantity),
        "registered_at" => b.registered_at.cmp(&a.registered_at),
        _ => Ordering::Equal,
    };
    primary.then_with(|| b.id.cmp(&a.id))
}

#[async_trait]
impl MovementRepository for InMemoryMovementRepository {
    async fn append(&self, movement: NewMovement) -> Result<Movement, InventoryError> {
        let mut movements = self.inner.write().await;
        let stored = Movement {
            id: movements.len() as i64 + 1,
            product_id: movement.product_id,
            quantity: movement.quantity,
            movement_type: movement.kind.as_str().to_string(),
            registered_at: movement.registered_at,
        };
        movements.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_product(
        &self,
        product_id: i64,
        page: &PageRequest,
    ) -> Result<(Vec<Movement>, u64), InventoryError> {
        let mut matching: Vec<Movement> = self
            .inner
            .read()
            .await
            .iter()
            .filter(|m| m.product_id == product_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| compare_desc(page.sort_column, a, b));
        let total = matching.len() as u64;
        Ok((page.slice(&matching), total))
    }

    async fn ping(&self) -> Result<(), InventoryError> {
        Ok(())
    }
}
