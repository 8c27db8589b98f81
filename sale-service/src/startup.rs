use axum::{
    Router,
    routing::{get, post},
};
use secrecy::ExposeSecret;
use service_core::auth::back_office_policy;
use service_core::clients::{ClientServiceClient, InventoryServiceClient, ProductServiceClient};
use service_core::error::AppError;
use service_core::middleware::with_service_layers;
use service_core::utils::shutdown_signal;
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::SaleConfig;
use crate::handlers;
use crate::services::{
    ClientLookup, MongoSaleRepository, ProductLookup, SaleRepository, SaleService, StockDebit,
};

#[derive(Clone)]
pub struct AppState {
    pub sales: SaleService,
}

impl AppState {
    pub fn new(
        sales: Arc<dyn SaleRepository>,
        clients: Arc<dyn ClientLookup>,
        products: Arc<dyn ProductLookup>,
        inventory: Arc<dyn StockDebit>,
    ) -> Self {
        Self {
            sales: SaleService::new(sales, clients, products, inventory),
        }
    }

    /// Wires the HTTP clients for the three downstream services.
    pub fn with_remote_services(
        sales: Arc<dyn SaleRepository>,
        config: &SaleConfig,
    ) -> Result<Self, AppError> {
        let clients = ClientServiceClient::new(config.client_service.clone())
            .map_err(|e| client_build_error("client-service", e))?;
        let products = ProductServiceClient::new(config.product_service.clone())
            .map_err(|e| client_build_error("product-service", e))?;
        let inventory = InventoryServiceClient::new(config.inventory_service.clone())
            .map_err(|e| client_build_error("inventory-service", e))?;

        Ok(Self::new(
            sales,
            Arc::new(clients),
            Arc::new(products),
            Arc::new(inventory),
        ))
    }
}

fn client_build_error(service: &str, e: impl std::fmt::Display) -> AppError {
    AppError::ConfigError(anyhow::anyhow!("Failed to build {} client: {}", service, e))
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/api/sales",
            post(handlers::register_sale).get(handlers::list_sales),
        )
        .route("/api/sales/client/:id", post(handlers::list_sales_by_client))
        .with_state(state);

    with_service_layers(router, back_office_policy())
}

type ServerFuture = Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>;

pub struct Application {
    port: u16,
    server: ServerFuture,
}

impl Application {
    pub async fn build(config: SaleConfig) -> Result<Self, AppError> {
        let repo = MongoSaleRepository::connect(
            config.mongodb.uri.expose_secret(),
            &config.mongodb.database,
        )
        .await?;
        repo.initialize_indexes().await?;

        let state = AppState::with_remote_services(Arc::new(repo), &config)?;
        Self::build_with_state(config, state).await
    }

    pub async fn build_with_state(config: SaleConfig, state: AppState) -> Result<Self, AppError> {
        let app = build_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port, "sale-service listening");

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::pin(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
