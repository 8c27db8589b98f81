use chrono::Utc;
use rust_decimal::Decimal;
use service_core::clients::{CallContext, ClientResponse};
use service_core::pagination::{Page, PageRequest, Paging};
use service_core::utils::is_not_positive;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::collaborators::{ClientLookup, ProductLookup, StockDebit};
use super::error::SaleError;
use super::metrics::{record_sale, record_sale_amount, record_stock_debit};
use super::repository::SaleRepository;
use crate::dtos::{SaleDetailRequest, SaleRequest};
use crate::models::{NewSale, RecordedSale, SALE_SORT_KEYS, Sale, SaleDetail};

/// Registers sales: validates the request against client-service and
/// product-service, stores the sale, then debits stock through inventory-service.
///
/// Nothing here is transactional across services. The sale is stored before any
/// debit is sent and a failed debit is logged, never compensated.
#[derive(Clone)]
pub struct SaleService {
    sales: Arc<dyn SaleRepository>,
    clients: Arc<dyn ClientLookup>,
    products: Arc<dyn ProductLookup>,
    inventory: Arc<dyn StockDebit>,
}

impl SaleService {
    pub fn new(
        sales: Arc<dyn SaleRepository>,
        clients: Arc<dyn ClientLookup>,
        products: Arc<dyn ProductLookup>,
        inventory: Arc<dyn StockDebit>,
    ) -> Self {
        Self {
            sales,
            clients,
            products,
            inventory,
        }
    }

    #[instrument(skip(self, ctx, request), fields(user = %ctx.identity.username))]
    pub async fn register_sale(
        &self,
        ctx: &CallContext,
        request: &SaleRequest,
    ) -> Result<RecordedSale, SaleError> {
        let result = self.register(ctx, request).await;
        record_sale(if result.is_ok() { "recorded" } else { "rejected" });
        result
    }

    async fn register(
        &self,
        ctx: &CallContext,
        request: &SaleRequest,
    ) -> Result<RecordedSale, SaleError> {
        if is_not_positive(request.client_id) {
            return Err(SaleError::ClientIdInvalid);
        }
        let client_id = request.client_id.unwrap_or_default();
        let lines = request
            .details
            .as_deref()
            .filter(|d| !d.is_empty())
            .ok_or(SaleError::DetailsInvalid)?;

        let client = self.require_client(ctx, client_id).await?;
        let details = self.price_lines(ctx, lines).await?;
        let sale =
            NewSale::new(client_id, Utc::now(), details).ok_or(SaleError::AmountTooLarge)?;

        let sale = self.sales.insert(sale).await?;

        record_sale_amount(sale.total);
        info!(
            sale_id = %sale.id,
            client_id,
            total = %sale.total,
            items = sale.details.len(),
            "Sale recorded"
        );

        self.debit_stock(ctx, &sale).await;

        Ok(RecordedSale {
            sale,
            client: client.full_name(),
        })
    }

    async fn require_client(
        &self,
        ctx: &CallContext,
        client_id: i64,
    ) -> Result<ClientResponse, SaleError> {
        self.clients
            .find_client(ctx, client_id)
            .await?
            .ok_or(SaleError::ClientNotFound)
    }

    /// Checks every line in request order and captures each product's current price.
    async fn price_lines(
        &self,
        ctx: &CallContext,
        lines: &[SaleDetailRequest],
    ) -> Result<Vec<SaleDetail>, SaleError> {
        let mut seen = HashSet::with_capacity(lines.len());
        let mut details = Vec::with_capacity(lines.len());

        for line in lines {
            if is_not_positive(line.quantity) {
                return Err(SaleError::QuantityInvalid);
            }
            if is_not_positive(line.product_id) {
                return Err(SaleError::ProductIdInvalid);
            }
            let (product_id, quantity) = (
                line.product_id.unwrap_or_default(),
                line.quantity.unwrap_or_default(),
            );
            if !seen.insert(product_id) {
                return Err(SaleError::ProductRepeated);
            }

            let product = self
                .products
                .find_product(ctx, product_id)
                .await?
                .ok_or(SaleError::ProductNotFound)?;

            // Snapshot only; stock is not reserved.
            if quantity > product.stock {
                return Err(SaleError::QuantityGreaterThanStock);
            }
            if product.price <= Decimal::ZERO {
                return Err(SaleError::PriceInvalid);
            }

            let detail = SaleDetail::priced(product_id, quantity, product.price)
                .ok_or(SaleError::AmountTooLarge)?;
            details.push(detail);
        }

        Ok(details)
    }

    async fn debit_stock(&self, ctx: &CallContext, sale: &Sale) {
        for detail in &sale.details {
            match self
                .inventory
                .debit(ctx, detail.product_id, detail.quantity)
                .await
            {
                Ok(movement) => {
                    record_stock_debit("applied");
                    info!(
                        sale_id = %sale.id,
                        movement_id = movement.id,
                        product_id = detail.product_id,
                        quantity = detail.quantity,
                        "Stock debited"
                    );
                }
                Err(e) => {
                    record_stock_debit("failed");
                    warn!(
                        sale_id = %sale.id,
                        product_id = detail.product_id,
                        quantity = detail.quantity,
                        error = %e,
                        "Stock debit failed; sale kept"
                    );
                }
            }
        }
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_sales(
        &self,
        ctx: &CallContext,
        paging: &Paging,
    ) -> Result<Page<RecordedSale>, SaleError> {
        let request = paging.validate(SALE_SORT_KEYS)?;
        let (sales, total) = self.sales.list(&request).await?;
        let recorded = self.with_client_names(ctx, sales).await?;
        Ok(Page::new(recorded, &request, total))
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_sales_by_client(
        &self,
        ctx: &CallContext,
        client_id: i64,
        paging: &Paging,
    ) -> Result<Page<RecordedSale>, SaleError> {
        let request: PageRequest = paging.validate(SALE_SORT_KEYS)?;
        if client_id <= 0 {
            return Err(SaleError::ClientIdInvalid);
        }
        let client = self.require_client(ctx, client_id).await?.full_name();

        let (sales, total) = self.sales.list_by_client(client_id, &request).await?;
        let recorded = sales
            .into_iter()
            .map(|sale| RecordedSale {
                sale,
                client: client.clone(),
            })
            .collect();
        Ok(Page::new(recorded, &request, total))
    }

    /// Resolves each distinct client on the page once. A client that no longer
    /// resolves is shown with an empty name rather than failing the page.
    async fn with_client_names(
        &self,
        ctx: &CallContext,
        sales: Vec<Sale>,
    ) -> Result<Vec<RecordedSale>, SaleError> {
        let mut names: HashMap<i64, String> = HashMap::new();
        let mut recorded = Vec::with_capacity(sales.len());

        for sale in sales {
            let client = match names.get(&sale.client_id) {
                Some(name) => name.clone(),
                None => {
                    let name = match self.clients.find_client(ctx, sale.client_id).await? {
                        Some(client) => client.full_name(),
                        None => {
                            warn!(client_id = sale.client_id, "Sale references unknown client");
                            String::new()
                        }
                    };
                    names.insert(sale.client_id, name.clone());
                    name
                }
            };
            recorded.push(RecordedSale { sale, client });
        }

        Ok(recorded)
    }

    pub async fn ping(&self) -> Result<(), SaleError> {
        self.sales.ping().await
    }
}
