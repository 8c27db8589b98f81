use axum::{Router, routing::get};
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

use crate::config::ClientConfig;
use crate::handlers;
use crate::services::{ClientRepository, ClientService, PgClientRepository};

#[derive(Clone)]
pub struct AppState {
    pub clients: ClientService,
}

impl AppState {
    pub fn new(repo: Arc<dyn ClientRepository>) -> Self {
        Self {
            clients: ClientService::new(repo),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/api/clients",
            get(handlers::list_clients).post(handlers::create_client),
        )
        .route("/api/clients/:id", get(handlers::get_client))
        .route(
            "/api/clients/document/:number/:document_type",
            get(handlers::get_client_by_document),
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
    pub async fn build(config: ClientConfig) -> Result<Self, AppError> {
        let repo = PgClientRepository::connect(
            config.database.url.expose_secret(),
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?;
        repo.run_migrations().await?;

        Self::build_with_state(config, AppState::new(Arc::new(repo))).await
    }

    pub async fn build_with_state(config: ClientConfig, state: AppState) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port, "client-service listening");

        let server = axum::serve(listener, build_router(state))
            .with_graceful_shutdown(shutdown_signal());

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
