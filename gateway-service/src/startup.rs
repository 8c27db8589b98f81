use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use secrecy::ExposeSecret;
use service_core::auth::{JwtService, back_office_policy};
use service_core::error::AppError;
use service_core::middleware::{
    IpRateLimiter, create_ip_rate_limiter, http_trace_layer, ip_rate_limit_middleware,
    metrics_middleware, request_id_middleware, security_headers_middleware,
};
use service_core::utils::shutdown_signal;
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::handlers;
use crate::middleware::{Authenticator, authenticate_middleware};
use crate::routing::RouteTable;
use crate::services::Proxy;

#[derive(Clone)]
pub struct AppState {
    pub proxy: Proxy,
    pub authenticator: Arc<Authenticator>,
}

impl AppState {
    pub fn new(config: &GatewayConfig) -> Result<Self, AppError> {
        let routes = RouteTable::new(config.routes.clone());
        let proxy = Proxy::new(
            routes,
            Duration::from_secs(config.upstream_timeout_secs),
            config.max_body_bytes,
        )
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Failed to build proxy client: {}", e)))?;

        // The gateway only verifies tokens, so the expiry passed here is unused.
        let jwt = JwtService::new(config.jwt.secret.expose_secret(), &config.jwt.issuer, 0);

        Ok(Self {
            proxy,
            authenticator: Arc::new(Authenticator::new(jwt, back_office_policy())),
        })
    }
}

/// The IP rate limit is the outermost layer and sees every request.
pub fn build_router(state: AppState, limiter: IpRateLimiter) -> Router {
    let authenticator = state.authenticator.clone();

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .fallback(handlers::proxy_request)
        .with_state(state)
        .layer(from_fn_with_state(authenticator, authenticate_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(http_trace_layer())
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn_with_state(limiter, ip_rate_limit_middleware))
}

type ServerFuture = Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>;

pub struct Application {
    port: u16,
    server: ServerFuture,
}

impl Application {
    pub async fn build(config: GatewayConfig) -> Result<Self, AppError> {
        let state = AppState::new(&config)?;
        let limiter =
            create_ip_rate_limiter(config.rate_limit.attempts, config.rate_limit.window_seconds)?;
        let app = build_router(state, limiter);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port, routes = config.routes.len(), "gateway-service listening");

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
