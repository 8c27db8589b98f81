use chrono::Utc;
use rust_decimal::Decimal;
use service_core::clients::MovementKind;
use service_core::pagination::{Page, Paging};
use service_core::utils::{is_blank, is_not_positive};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::error::ProductError;
use super::metrics::{record_product_created, record_stock_update};
use super::repository::ProductRepository;
use crate::dtos::ProductRequest;
use crate::models::{NewProduct, PRODUCT_SORT_KEYS, Product, ProductChanges, StockUpdate};

#[derive(Clone)]
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
}

/// Name, description and price after validation.
struct ValidDetails {
    name: String,
    description: String,
    price: Decimal,
}

fn validate_details(request: &ProductRequest) -> Result<ValidDetails, ProductError> {
    if is_blank(request.name.as_deref()) {
        return Err(ProductError::NameEmpty);
    }
    if is_blank(request.description.as_deref()) {
        return Err(ProductError::DescriptionEmpty);
    }
    let price = request
        .price
        .filter(|p| *p > Decimal::ZERO)
        .ok_or(ProductError::PriceInvalid)?;

    Ok(ValidDetails {
        name: request.name.as_deref().unwrap_or_default().trim().to_string(),
        description: request
            .description
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_string(),
        price,
    })
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, request))]
    pub async fn add_product(&self, request: &ProductRequest) -> Result<Product, ProductError> {
        let details = validate_details(request)?;
        if self.repo.name_taken(&details.name, None).await? {
            return Err(ProductError::NameExists);
        }

        let product = self
            .repo
            .insert(NewProduct {
                name: details.name,
                description: details.description,
                price: details.price,
                created_at: Utc::now().date_naive(),
            })
            .await?;

        record_product_created();
        info!(product_id = product.id, name = %product.name, "Product created");
        Ok(product)
    }

    #[instrument(skip(self, request))]
    pub async fn update_product(
        &self,
        id: i64,
        request: &ProductRequest,
    ) -> Result<Product, ProductError> {
        if id <= 0 {
            return Err(ProductError::InvalidId);
        }
        let details = validate_details(request)?;
        if self.repo.name_taken(&details.name, Some(id)).await? {
            return Err(ProductError::NameExists);
        }

        let changes = ProductChanges {
            name: details.name,
            description: details.description,
            price: details.price,
        };
        self.repo
            .update_details(id, &changes)
            .await?
            .ok_or(ProductError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i64) -> Result<Product, ProductError> {
        if id <= 0 {
            return Err(ProductError::InvalidId);
        }
        self.repo.find_by_id(id).await?.ok_or(ProductError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self, paging: &Paging) -> Result<Page<Product>, ProductError> {
        let request = paging.validate(PRODUCT_SORT_KEYS)?;
        let (items, total) = self.repo.list(&request).await?;
        Ok(Page::new(items, &request, total))
    }

    /// Case-insensitive substring match on the product name.
    #[instrument(skip(self))]
    pub async fn search_by_name(
        &self,
        name: &str,
        paging: &Paging,
    ) -> Result<Page<Product>, ProductError> {
        let request = paging.validate(PRODUCT_SORT_KEYS)?;
        let (items, total) = self.repo.search_by_name(name.trim(), &request).await?;
        Ok(Page::new(items, &request, total))
    }

    /// Applies an inbound or outbound movement. The store refuses to take
    /// stock below zero, so concurrent debits cannot overdraw.
    #[instrument(skip(self))]
    pub async fn update_stock(
        &self,
        id: i64,
        quantity: i64,
        movement_type: &str,
    ) -> Result<Product, ProductError> {
        if id <= 0 {
            return Err(ProductError::InvalidId);
        }
        if is_not_positive(Some(quantity)) {
            return Err(ProductError::QuantityInvalid);
        }
        let kind = MovementKind::parse(movement_type).ok_or(ProductError::InvalidTypeMovement)?;

        match self.repo.apply_stock_delta(id, kind.delta(quantity)).await? {
            StockUpdate::Applied(product) => {
                record_stock_update(kind, "applied");
                info!(product_id = id, movement = %kind, quantity, stock = product.stock, "Stock updated");
                Ok(product)
            }
            StockUpdate::Insufficient => {
                record_stock_update(kind, "insufficient");
                warn!(product_id = id, quantity, "Stock update would go negative");
                Err(ProductError::InvalidStock)
            }
            StockUpdate::Overflow => {
                record_stock_update(kind, "overflow");
                warn!(product_id = id, quantity, "Stock update would overflow");
                Err(ProductError::StockTooLarge)
            }
            StockUpdate::Missing => {
                record_stock_update(kind, "missing");
                Err(ProductError::NotFound)
            }
        }
    }

    pub async fn ping(&self) -> Result<(), ProductError> {
        self.repo.ping().await
    }
}
