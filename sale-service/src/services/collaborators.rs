//! The three remote services a sale depends on, as traits so the orchestrator
//! can run against fakes.

use async_trait::async_trait;
use service_core::clients::{
    CallContext, ClientCallError, ClientResponse, ClientServiceClient, InventoryServiceClient,
    MovementRequest, MovementResponse, ProductResponse, ProductServiceClient,
};

#[async_trait]
pub trait ClientLookup: Send + Sync {
    async fn find_client(
        &self,
        ctx: &CallContext,
        id: i64,
    ) -> Result<Option<ClientResponse>, ClientCallError>;
}

#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn find_product(
        &self,
        ctx: &CallContext,
        id: i64,
    ) -> Result<Option<ProductResponse>, ClientCallError>;
}

#[async_trait]
pub trait StockDebit: Send + Sync {
    async fn debit(
        &self,
        ctx: &CallContext,
        product_id: i64,
        quantity: i64,
    ) -> Result<MovementResponse, ClientCallError>;
}

#[async_trait]
impl ClientLookup for ClientServiceClient {
    async fn find_client(
        &self,
        ctx: &CallContext,
        id: i64,
    ) -> Result<Option<ClientResponse>, ClientCallError> {
        ClientServiceClient::find_client(self, ctx, id).await
    }
}

#[async_trait]
impl ProductLookup for ProductServiceClient {
    async fn find_product(
        &self,
        ctx: &CallContext,
        id: i64,
    ) -> Result<Option<ProductResponse>, ClientCallError> {
        ProductServiceClient::find_product(self, ctx, id).await
    }
}

#[async_trait]
impl StockDebit for InventoryServiceClient {
    async fn debit(
        &self,
        ctx: &CallContext,
        product_id: i64,
        quantity: i64,
    ) -> Result<MovementResponse, ClientCallError> {
        self.register_movement(ctx, &MovementRequest::outbound(product_id, quantity))
            .await
    }
}
