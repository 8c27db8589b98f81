use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use secrecy::ExposeSecret;
use service_core::auth::{JwtService, back_office_policy};
use service_core::error::AppError;
use service_core::middleware::{
    IpRateLimiter, create_ip_rate_limiter, ip_rate_limit_middleware, with_service_layers,
};
use service_core::utils::shutdown_signal;
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AuthConfig;
use crate::handlers;
use crate::services::{AccountService, PgUserRepository, UserRepository};

#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
}

impl AppState {
    pub fn new(repo: Arc<dyn UserRepository>, config: &AuthConfig) -> Self {
        let jwt = JwtService::new(
            config.jwt.secret.expose_secret(),
            config.jwt.issuer.clone(),
            config.jwt.expiry_minutes,
        );
        Self {
            accounts: AccountService::new(repo, jwt),
        }
    }
}

/// Login attempts are limited per client IP; sign-up is not.
pub fn build_router(state: AppState, login_limiter: IpRateLimiter) -> Router {
    let login = Router::new()
        .route("/api/auth/log-in", post(handlers::log_in))
        .route_layer(from_fn_with_state(login_limiter, ip_rate_limit_middleware));

    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/api/auth/sign-up", post(handlers::sign_up))
        .merge(login)
        .with_state(state);

    with_service_layers(router, back_office_policy())
}

type ServerFuture = Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>;

pub struct Application {
    port: u16,
    server: ServerFuture,
}

impl Application {
    pub async fn build(config: AuthConfig) -> Result<Self, AppError> {
        let repo = PgUserRepository::connect(
            config.database.url.expose_secret(),
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?;
        repo.run_migrations().await?;

        let state = AppState::new(Arc::new(repo), &config);
        Self::build_with_state(config, state).await
    }

    pub async fn build_with_state(config: AuthConfig, state: AppState) -> Result<Self, AppError> {
        let limiter = create_ip_rate_limiter(
            config.login_rate_limit.attempts,
            config.login_rate_limit.window_seconds,
        )?;
        let app = build_router(state, limiter);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port, "auth-service listening");

        let server = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
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
