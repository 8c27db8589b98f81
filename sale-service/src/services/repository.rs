use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{Client as MongoClient, Collection, Database, IndexModel};
use service_core::error::AppError;
use service_core::pagination::PageRequest;
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use super::error::SaleError;
use crate::models::{NewSale, Sale};

#[async_trait]
pub trait SaleRepository: Send + Sync {
    async fn insert(&self, sale: NewSale) -> Result<Sale, SaleError>;

    async fn list(&self, page: &PageRequest) -> Result<(Vec<Sale>, u64), SaleError>;

    async fn list_by_client(
        &self,
        client_id: i64,
        page: &PageRequest,
    ) -> Result<(Vec<Sale>, u64), SaleError>;

    async fn ping(&self) -> Result<(), SaleError>;
}

const SALES_COLLECTION: &str = "sales";

#[derive(Clone)]
pub struct MongoSaleRepository {
    client: MongoClient,
    db: Database,
}

impl MongoSaleRepository {
    #[instrument(skip(uri))]
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        info!("Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e))
        })?;
        let db = client.database(database);
        Ok(Self { client, db })
    }

    #[instrument(skip(self))]
    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        let client_index = IndexModel::builder()
            .keys(doc! { "client_id": 1, "date": -1 })
            .options(
                IndexOptions::builder()
                    .name("client_date_idx".to_string())
                    .build(),
            )
            .build();

        self.sales()
            .create_index(client_index, None)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Index creation failed: {}", e)))?;
        info!("Sale indexes ready");
        Ok(())
    }

    fn sales(&self) -> Collection<Sale> {
        self.db.collection(SALES_COLLECTION)
    }

    async fn find_page(
        &self,
        filter: Document,
        page: &PageRequest,
    ) -> Result<(Vec<Sale>, u64), SaleError> {
        let total = self.sales().count_documents(filter.clone(), None).await?;

        let mut sort = Document::new();
        sort.insert(page.sort_column, -1);
        if page.sort_column != "_id" {
            sort.insert("_id", -1);
        }
        let options = FindOptions::builder()
            .sort(sort)
            .skip(page.offset())
            .limit(page.limit() as i64)
            .build();

        let sales: Vec<Sale> = self.sales().find(filter, options).await?.try_collect().await?;
        Ok((sales, total))
    }
}

#[async_trait]
impl SaleRepository for MongoSaleRepository {
    #[instrument(skip(self, sale), fields(client_id = sale.client_id))]
    async fn insert(&self, sale: NewSale) -> Result<Sale, SaleError> {
        let sale = sale.into_sale(ObjectId::new());
        self.sales().insert_one(&sale, None).await?;
        Ok(sale)
    }

    #[instrument(skip(self))]
    async fn list(&self, page: &PageRequest) -> Result<(Vec<Sale>, u64), SaleError> {
        self.find_page(doc! {}, page).await
    }

    #[instrument(skip(self))]
    async fn list_by_client(
        &self,
        client_id: i64,
        page: &PageRequest,
    ) -> Result<(Vec<Sale>, u64), SaleError> {
        self.find_page(doc! { "client_id": client_id }, page).await
    }

    async fn ping(&self) -> Result<(), SaleError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemorySaleRepository {
    inner: Arc<RwLock<Vec<Sale>>>,
}

impl InMemorySaleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<Sale> {
        self.inner.read().await.clone()
    }
}

fn compare_desc(column: &str, a: &Sale, b: &Sale) -> Ordering {
    let primary = match column {
        "client_id" => b.client_id.cmp(&a.client_id),
        "date" => b.date.cmp(&a.date),
        _ => Ordering::Equal,
    };
    primary.then_with(|| b.id.bytes().cmp(&a.id.bytes()))
}

impl InMemorySaleRepository {
    async fn page_of(
        &self,
        filter: impl Fn(&Sale) -> bool,
        page: &PageRequest,
    ) -> (Vec<Sale>, u64) {
        let mut matching: Vec<Sale> = self
            .inner
            .read()
            .await
            .iter()
            .filter(|s| filter(s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| compare_desc(page.sort_column, a, b));
        let total = matching.len() as u64;
        (page.slice(&matching), total)
    }
}

#[async_trait]
impl SaleRepository for InMemorySaleRepository {
    async fn insert(&self, sale: NewSale) -> Result<Sale, SaleError> {
        let sale = sale.into_sale(ObjectId::new());
        self.inner.write().await.push(sale.clone());
        Ok(sale)
    }

    async fn list(&self, page: &PageRequest) -> Result<(Vec<Sale>, u64), SaleError> {
        Ok(self.page_of(|_| true, page).await)
    }

    async fn list_by_client(
        &self,
        client_id: i64,
        page: &PageRequest,
    ) -> Result<(Vec<Sale>, u64), SaleError> {
        Ok(self.page_of(|s| s.client_id == client_id, page).await)
    }

    async fn ping(&self) -> Result<(), SaleError> {
        Ok(())
    }
}
