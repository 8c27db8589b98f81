use secrecy::Secret;
use serde::Deserialize;
use service_core::config::{self as core_config, get_env, is_production, parse_env};
use service_core::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub jwt: JwtConfig,
    pub routes: Vec<RouteConfig>,
    pub upstream_timeout_secs: u64,
    pub max_body_bytes: usize,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: Secret<String>,
    pub issuer: String,
}

/// Requests whose path starts with `prefix` go to `upstream`.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    pub prefix: String,
    pub service: String,
    pub upstream: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub attempts: u32,
    pub window_seconds: u64,
}

const DEFAULT_ROUTES: &[(&str, &str, &str, &str)] = &[
    ("/api/auth", "auth-service", "AUTH_SERVICE_URL", "http://localhost:8085"),
    ("/api/clients", "client-service", "CLIENT_SERVICE_URL", "http://localhost:8081"),
    ("/api/products", "product-service", "PRODUCT_SERVICE_URL", "http://localhost:8082"),
    ("/api/inventory", "inventory-service", "INVENTORY_SERVICE_URL", "http://localhost:8083"),
    ("/api/sales", "sale-service", "SALE_SERVICE_URL", "http://localhost:8084"),
];

impl GatewayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = is_production();

        let routes = DEFAULT_ROUTES
            .iter()
            .map(|&(prefix, service, key, default)| {
                Ok(RouteConfig {
                    prefix: prefix.to_string(),
                    service: service.to_string(),
                    upstream: get_env(key, Some(default), is_prod)?,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(Self {
            common,
            jwt: JwtConfig {
                secret: Secret::new(get_env(
                    "JWT_SECRET",
                    Some("dev-only-secret-change-me"),
                    is_prod,
                )?),
                issuer: get_env("JWT_ISSUER", Some("retail-back-office"), is_prod)?,
            },
            routes,
            upstream_timeout_secs: parse_env("UPSTREAM_TIMEOUT_SECS", 10)?,
            max_body_bytes: parse_env("MAX_BODY_BYTES", 2 * 1024 * 1024)?,
            rate_limit: RateLimitConfig {
                attempts: parse_env("RATE_LIMIT_ATTEMPTS", 300)?,
                window_seconds: parse_env("RATE_LIMIT_WINDOW_SECONDS", 60)?,
            },
        })
    }
}
