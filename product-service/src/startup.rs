use axum::{
    Router,
    routing::{get, post, put},
};
use secrecy::ExposeSecret;
use service_core::auth::back_office_policy;
use service_core::error::AppError;
use service_core::middleware::with_service_layers;
use service_core::utils::shutdown_signal;
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::ProductConfig;
use crate::handlers;
use crate::services::{PgProductRepository, ProductRepository, ProductService};

#[derive(Clone)]
pub struct AppState {
    pub products: ProductService,
}

impl AppState {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self {
            products: ProductService::new(repo),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/api/products",
            post(handlers::create_product).get(handlers::list_products),
        )
        .route(
            "/api/products/:id",
            get(handlers::get_product).patch(handlers::update_product),
        )
        .route("/api/products/name/:name", post(handlers::search_products))
        .route(
            "/api/products/stock/:id/:quantity/:movement_type",
            put(handlers::update_stock),
        )
        .with_state(state);

    with_service_layers(router, back_office_policy())
}

type ServerFuture = Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>;

pub struct Application {
    port: u16,
    server: ServerFuture,
}

impl Application {
    pub async fn build(config: ProductConfig) -> Result<Self, AppError> {
        let repo = PgProductRepository::connect(
            config.database.url.expose_secret(),
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?;
        repo.run_migrations().await?;

        Self::build_with_state(config, AppState::new(Arc::new(repo))).await
    }

    /// Binds the listener over an already assembled state.
    pub async fn build_with_state(config: ProductConfig, state: AppState) -> Result<Self, AppError> {
        let app = build_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port, "product-service listening");

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
