use gateway_service::config::GatewayConfig;
use gateway_service::startup::Application;
use service_core::observability::{init_metrics, init_tracing};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = GatewayConfig::load()
        .map_err(|e| std::io::Error::other(format!("Configuration error: {}", e)))?;

    init_tracing(
        "gateway-service",
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    )
    .map_err(std::io::Error::other)?;
    init_metrics().map_err(|e| std::io::Error::other(e.to_string()))?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start gateway-service: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    app.run_until_stopped().await
}
