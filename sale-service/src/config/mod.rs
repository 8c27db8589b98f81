use secrecy::Secret;
use serde::Deserialize;
use service_core::clients::ServiceClientConfig;
use service_core::config::{self as core_config, get_env, is_production, parse_env};
use service_core::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct SaleConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub client_service: ServiceClientConfig,
    pub product_service: ServiceClientConfig,
    pub inventory_service: ServiceClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: Secret<String>,
    pub database: String,
}

impl SaleConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = is_production();
        let timeout_secs = parse_env("DOWNSTREAM_TIMEOUT_SECS", 5)?;

        let downstream = |key: &str, default: &str| -> Result<ServiceClientConfig, AppError> {
            Ok(ServiceClientConfig {
                base_url: get_env(key, Some(default), is_prod)?,
                timeout_secs,
            })
        };

        Ok(Self {
            common,
            mongodb: MongoConfig {
                uri: Secret::new(get_env(
                    "MONGODB_URI",
                    Some("mongodb://localhost:27017"),
                    is_prod,
                )?),
                database: get_env("MONGODB_DATABASE", Some("sales"), is_prod)?,
            },
            client_service: downstream("CLIENT_SERVICE_URL", "http://localhost:8081")?,
            product_service: downstream("PRODUCT_SERVICE_URL", "http://localhost:8082")?,
            inventory_service: downstream("INVENTORY_SERVICE_URL", "http://localhost:8083")?,
        })
    }
}
