use async_trait::async_trait;
use service_core::clients::{
    CallContext, ClientCallError, MovementKind, ProductResponse, ProductServiceClient,
};

/// What inventory needs from product-service.
#[async_trait]
pub trait ProductGateway: Send + Sync {
    async fn find_product(
        &self,
        ctx: &CallContext,
        id: i64,
    ) -> Result<Option<ProductResponse>, ClientCallError>;

    async fn update_stock(
        &self,
        ctx: &CallContext,
        id: i64,
        quantity: i64,
        kind: MovementKind,
    ) -> Result<ProductResponse, ClientCallError>;
}

#[async_trait]
impl ProductGateway for ProductServiceClient {
    async fn find_product(
        &self,
        ctx: &CallContext,
        id: i64,
    ) -> Result<Option<ProductResponse>, ClientCallError> {
        ProductServiceClient::find_product(self, ctx, id).await
    }

    async fn update_stock(
        &self,
        ctx: &CallContext,
        id: i64,
        quantity: i64,
        kind: MovementKind,
    ) -> Result<ProductResponse, ClientCallError> {
        ProductServiceClient::update_stock(self, ctx, id, quantity, kind).await
    }
}
