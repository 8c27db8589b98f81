use async_trait::async_trait;
use service_core::error::AppError;
use service_core::pagination::PageRequest;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{info, instrument};

use super::error::ProductError;
use super::metrics::record_db_query;
use crate::models::{NewProduct, Product, ProductChanges, StockUpdate};

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, product: NewProduct) -> Result<Product, ProductError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, ProductError>;

    /// Case-insensitive name clash check, optionally ignoring one product.
    async fn name_taken(&self, name: &str, excluding: Option<i64>) -> Result<bool, ProductError>;

    async fn update_details(
        &self,
        id: i64,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, ProductError>;

    /// Adds `delta` to stock unless the result would be negative or overflow.
    async fn apply_stock_delta(&self, id: i64, delta: i64) -> Result<StockUpdate, ProductError>;

    async fn list(&self, page: &PageRequest) -> Result<(Vec<Product>, u64), ProductError>;

    async fn search_by_name(
        &self,
        fragment: &str,
        page: &PageRequest,
    ) -> Result<(Vec<Product>, u64), ProductError>;

    async fn ping(&self) -> Result<(), ProductError>;
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, active, created_at, stock";

#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    #[instrument(skip(database_url), fields(service = "product-service"))]
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
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        Ok(Self { pool })
    }

    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        Ok(())
    }
}

fn escape_like(fragment: &str) -> String {
    fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    #[instrument(skip(self, product), fields(name = %product.name))]
    async fn insert(&self, product: NewProduct) -> Result<Product, ProductError> {
        let start = Instant::now();
        let result = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, description, price, active, created_at, stock) \
             VALUES ($1, $2, $3, TRUE, $4, 0) RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                ProductError::NameExists
            }
            other => ProductError::Database(other),
        });
        record_db_query("insert_product", start.elapsed());
        result
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, ProductError> {
        let start = Instant::now();
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        record_db_query("find_product", start.elapsed());
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn name_taken(&self, name: &str, excluding: Option<i64>) -> Result<bool, ProductError> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM products WHERE LOWER(name) = LOWER($1) \
             AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    #[instrument(skip(self, changes))]
    async fn update_details(
        &self,
        id: i64,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, ProductError> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET name = $2, description = $3, price = $4 \
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.price)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                ProductError::NameExists
            }
            other => ProductError::Database(other),
        })
    }

    #[instrument(skip(self))]
    async fn apply_stock_delta(&self, id: i64, delta: i64) -> Result<StockUpdate, ProductError> {
        let start = Instant::now();
        let updated = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET stock = stock + $2 \
             WHERE id = $1 AND stock + $2 >= 0 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await;
        record_db_query("apply_stock_delta", start.elapsed());

        match updated {
            Ok(Some(product)) => return Ok(StockUpdate::Applied(product)),
            Ok(None) => {}
            // numeric_value_out_of_range: stock + delta left the bigint range.
            Err(sqlx::Error::Database(ref db_err)) if db_err.code().as_deref() == Some("22003") => {
                return Ok(StockUpdate::Overflow);
            }
            Err(e) => return Err(e.into()),
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(if exists {
            StockUpdate::Insufficient
        } else {
            StockUpdate::Missing
        })
    }

    #[instrument(skip(self))]
    async fn list(&self, page: &PageRequest) -> Result<(Vec<Product>, u64), ProductError> {
        let start = Instant::now();
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY {} DESC, id DESC LIMIT $1 OFFSET $2",
            page.sort_column
        ))
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;
        record_db_query("list_products", start.elapsed());

        Ok((products, total.max(0) as u64))
    }

    #[instrument(skip(self))]
    async fn search_by_name(
        &self,
        fragment: &str,
        page: &PageRequest,
    ) -> Result<(Vec<Product>, u64), ProductError> {
        let pattern = format!("%{}%", escape_like(fragment));

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE name ILIKE $1")
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE name ILIKE $1 \
             ORDER BY {} DESC, id DESC LIMIT $2 OFFSET $3",
            page.sort_column
        ))
        .bind(&pattern)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok((products, total.max(0) as u64))
    }

    async fn ping(&self) -> Result<(), ProductError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Process-local store used by tests and local runs without PostgreSQL.
#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    inner: Arc<RwLock<Store>>,
}

#[derive(Default)]
struct Store {
    next_id: i64,
    products: Vec<Product>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a product with an explicit stock level.
    pub async fn seed(&self, product: NewProduct, stock: i64) -> Product {
        let mut store = self.inner.write().await;
        store.next_id += 1;
        let product = Product {
            id: store.next_id,
            name: product.name,
            description: product.description,
            price: product.price,
            active: true,
            created_at: product.created_at,
            stock,
        };
        store.products.push(product.clone());
        product
    }
}

fn compare_desc(column: &str, a: &Product, b: &Product) -> Ordering {
    let primary = match column {
        "name" => b.name.cmp(&a.name),
        "price" => b.price.cmp(&a.price),
        "stock" => b.stock.cmp(&a.stock),
        "created_at" => b.created_at.cmp(&a.created_at),
        _ => Ordering::Equal,
    };
    primary.then_with(|| b.id.cmp(&a.id))
}

fn paged(mut matching: Vec<Product>, page: &PageRequest) -> (Vec<Product>, u64) {
    matching.sort_by(|a, b| compare_desc(page.sort_column, a, b));
    let total = matching.len() as u64;
    (page.slice(&matching), total)
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, product: NewProduct) -> Result<Product, ProductError> {
        if self.name_taken(&product.name, None).await? {
            return Err(ProductError::NameExists);
        }
        Ok(self.seed(product, 0).await)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, ProductError> {
        let store = self.inner.read().await;
        Ok(store.products.iter().find(|p| p.id == id).cloned())
    }

    async fn name_taken(&self, name: &str, excluding: Option<i64>) -> Result<bool, ProductError> {
        let store = self.inner.read().await;
        Ok(store
            .products
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(name) && Some(p.id) != excluding))
    }

    async fn update_details(
        &self,
        id: i64,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, ProductError> {
        let mut store = self.inner.write().await;
        Ok(store.products.iter_mut().find(|p| p.id == id).map(|p| {
            p.name = changes.name.clone();
            p.description = changes.description.clone();
            p.price = changes.price;
            p.clone()
        }))
    }

    async fn apply_stock_delta(&self, id: i64, delta: i64) -> Result<StockUpdate, ProductError> {
        let mut store = self.inner.write().await;
        let Some(product) = store.products.iter_mut().find(|p| p.id == id) else {
            return Ok(StockUpdate::Missing);
        };
        let Some(stock) = product.stock.checked_add(delta) else {
            return Ok(StockUpdate::Overflow);
        };
        if stock < 0 {
            return Ok(StockUpdate::Insufficient);
        }
        product.stock = stock;
        Ok(StockUpdate::Applied(product.clone()))
    }

    async fn list(&self, page: &PageRequest) -> Result<(Vec<Product>, u64), ProductError> {
        let all = self.inner.read().await.products.clone();
        Ok(paged(all, page))
    }

    async fn search_by_name(
        &self,
        fragment: &str,
        page: &PageRequest,
    ) -> Result<(Vec<Product>, u64), ProductError> {
        let needle = fragment.to_lowercase();
        let matching: Vec<Product> = self
            .inner
            .read()
            .await
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(paged(matching, page))
    }

    async fn ping(&self) -> Result<(), ProductError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use service_core::pagination::Paging;

    use crate::models::PRODUCT_SORT_KEYS;

    fn coffee(name: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: "Ground coffee".to_string(),
            price: dec!(5.00),
            created_at: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        }
    }

    #[tokio::test]
    async fn stock_delta_never_goes_negative() {
        let repo = InMemoryProductRepository::new();
        let product = repo.seed(coffee("Coffee"), 3).await;

        assert!(matches!(
            repo.apply_stock_delta(product.id, -3).await.unwrap(),
            StockUpdate::Applied(Product { stock: 0, .. })
        ));
        assert_eq!(
            repo.apply_stock_delta(product.id, -1).await.unwrap(),
            StockUpdate::Insufficient
        );
        assert_eq!(repo.apply_stock_delta(99, 1).await.unwrap(), StockUpdate::Missing);
    }

    #[tokio::test]
    async fn stock_delta_past_i64_max_is_an_overflow() {
        let repo = InMemoryProductRepository::new();
        let product = repo.seed(coffee("Coffee"), i64::MAX - 1).await;

        assert_eq!(
            repo.apply_stock_delta(product.id, 2).await.unwrap(),
            StockUpdate::Overflow
        );
        assert!(matches!(
            repo.apply_stock_delta(product.id, 1).await.unwrap(),
            StockUpdate::Applied(Product { stock: i64::MAX, .. })
        ));
    }

    #[tokio::test]
    async fn list_sorts_descending_by_requested_column() {
        let repo = InMemoryProductRepository::new();
        repo.seed(coffee("Beans"), 4).await;
        repo.seed(coffee("Arabica"), 9).await;
        repo.seed(coffee("Cocoa"), 1).await;

        let page = Paging::new(1, 2, "stock").validate(PRODUCT_SORT_KEYS).unwrap();
        let (items, total) = repo.list(&page).await.unwrap();

        assert_eq!(total, 3);
        let names: Vec<_> = items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Arabica", "Beans"]);
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
    }
}
