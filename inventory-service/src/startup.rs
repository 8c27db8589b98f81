use axum::{
    Router,
    routing::{get, post},
};
use secrecy::ExposeSecret;
use service_core::auth::back_office_policy;
use service_core::clients::ProductServiceClient;
use service_core::error::AppError;
use service_core::middleware::with_service_layers;
use service_core::utils::shutdown_signal;
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::InventoryConfig;
use crate::handlers;
use crate::services::{InventoryService, MovementRepository, PgMovementRepository, ProductGateway};

#[derive(Clone)]
pub struct AppState {
    pub inventory: InventoryService,
}

impl AppState {
    pub fn new(movements: Arc<dyn MovementRepository>, products: Arc<dyn ProductGateway>) -> Self {
        Self {
            inventory: InventoryService::new(movements, products),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/api/inventory", post(handlers::register_movement))
        .route("/api/inventory/:product_id", post(handlers::list_movements))
        .with_state(state);

    with_service_layers(router, back_office_policy())
}

type ServerFuture = Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>;

pub struct Application {
    port: u16,
    server: ServerFuture,
}

impl Application {
    pub async fn build(config: InventoryConfig) -> Result<Self, AppError> {
        let repo = PgMovementRepository::connect(
            config.database.url.expose_secret(),
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?;
        repo.run_migrations().await?;

        let products = ProductServiceClient::new(config.product_service.clone()).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Failed to build product-service client: {}", e))
        })?;

        let state = AppState::new(Arc::new(repo), Arc::new(products));
        Self::build_with_state(config, state).await
    }

    pub async fn build_with_state(
        config: InventoryConfig,
        state: AppState,
    ) -> Result<Self, AppError> {
        let app = build_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            product_service = %config.product_service.base_url,
            "inventory-service listening"
        );

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
