//! Runs every back-office service in process, wired to each other over real
//! HTTP on ephemeral ports, with the gateway in front.
//!
//! Relational stores and the sale store are the in-memory repositories, so
//! no database is needed.

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use secrecy::Secret;
use serde_json::{Value, json};
use service_core::clients::{ProductServiceClient, ServiceClientConfig};
use service_core::config::Config;
use std::sync::Arc;

const JWT_SECRET: &str = "workflow-secret";
const JWT_ISSUER: &str = "retail-back-office";

/// Role id seeded for `USER`.
pub const USER_ROLE_ID: i64 = 2;

fn ephemeral() -> Config {
    Config {
        port: 0,
        ..Config::default()
    }
}

fn unused_url(scheme: &str) -> Secret<String> {
    Secret::new(format!("{}://unused", scheme))
}

fn local(port: u16) -> String {
    format!("http://127.0.0.1:{}", port)
}

fn spawn(server: impl Future<Output = std::io::Result<()>> + Send + 'static) {
    tokio::spawn(async move {
        if let Err(e) = server.await {
            tracing::error!(error = %e, "Service stopped");
        }
    });
}

/// The running back office. Only the gateway address is exposed to tests.
pub struct BackOffice {
    pub gateway: String,
    pub http: Client,
    token: Option<String>,
}

impl BackOffice {
    pub async fn spawn() -> Result<Self> {
        let auth_port = spawn_auth().await?;
        let client_port = spawn_clients().await?;
        let product_port = spawn_products().await?;
        let inventory_port = spawn_inventory(product_port).await?;
        let sale_port = spawn_sales(client_port, product_port, inventory_port).await?;

        let routes = [
            ("/api/auth", "auth-service", auth_port),
            ("/api/clients", "client-service", client_port),
            ("/api/products", "product-service", product_port),
            ("/api/inventory", "inventory-service", inventory_port),
            ("/api/sales", "sale-service", sale_port),
        ]
        .into_iter()
        .map(|(prefix, service, port)| gateway_service::config::RouteConfig {
            prefix: prefix.to_string(),
            service: service.to_string(),
            upstream: local(port),
        })
        .collect();

        let config = gateway_service::config::GatewayConfig {
            common: ephemeral(),
            jwt: gateway_service::config::JwtConfig {
                secret: Secret::new(JWT_SECRET.to_string()),
                issuer: JWT_ISSUER.to_string(),
            },
            routes,
            upstream_timeout_secs: 5,
            max_body_bytes: 64 * 1024,
            rate_limit: gateway_service::config::RateLimitConfig {
                attempts: 1000,
                window_seconds: 60,
            },
        };
        let gateway = gateway_service::startup::Application::build(config)
            .await
            .context("gateway-service failed to start")?;
        let address = local(gateway.port());
        spawn(gateway.run_until_stopped());

        Ok(Self {
            gateway: address,
            http: Client::new(),
            token: None,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.gateway, path)
    }

    /// Builds a request through the gateway, carrying the session token if any.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let request = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Response> {
        Ok(self.request(reqwest::Method::POST, path).json(body).send().await?)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.request(reqwest::Method::GET, path).send().await?)
    }

    /// Signs up a staff user and keeps the token issued on log-in.
    pub async fn sign_in_as_staff(&mut self, username: &str, password: &str) -> Result<()> {
        let credentials = json!({"username": username, "password": password});

        let mut sign_up = credentials.clone();
        sign_up["roleId"] = json!(USER_ROLE_ID);
        let response = self.post("/api/auth/sign-up", &sign_up).await?;
        anyhow::ensure!(
            response.status().is_success(),
            "sign-up failed with {}",
            response.status()
        );

        let response = self.post("/api/auth/log-in", &credentials).await?;
        anyhow::ensure!(
            response.status().is_success(),
            "log-in failed with {}",
            response.status()
        );
        let body: Value = response.json().await?;
        let jwt = body["jwt"]
            .as_str()
            .context("log-in response has no jwt")?
            .to_string();
        self.token = Some(jwt);
        Ok(())
    }
}

async fn spawn_auth() -> Result<u16> {
    use auth_service::config::{AuthConfig, DatabaseConfig, JwtConfig, RateLimitConfig};

    let config = AuthConfig {
        common: ephemeral(),
        database: DatabaseConfig {
            url: unused_url("postgres"),
            max_connections: 1,
            min_connections: 0,
        },
        jwt: JwtConfig {
            secret: Secret::new(JWT_SECRET.to_string()),
            issuer: JWT_ISSUER.to_string(),
            expiry_minutes: 30,
        },
        login_rate_limit: RateLimitConfig {
            attempts: 100,
            window_seconds: 60,
        },
    };
    let repo = auth_service::services::InMemoryUserRepository::new();
    let state = auth_service::startup::AppState::new(Arc::new(repo), &config);
    let app = auth_service::startup::Application::build_with_state(config, state)
        .await
        .context("auth-service failed to start")?;
    let port = app.port();
    spawn(app.run_until_stopped());
    Ok(port)
}

async fn spawn_clients() -> Result<u16> {
    use client_service::config::{ClientConfig, DatabaseConfig};

    let config = ClientConfig {
        common: ephemeral(),
        database: DatabaseConfig {
            url: unused_url("postgres"),
            max_connections: 1,
            min_connections: 0,
        },
    };
    let repo = client_service::services::InMemoryClientRepository::new();
    let state = client_service::startup::AppState::new(Arc::new(repo));
    let app = client_service::startup::Application::build_with_state(config, state)
        .await
        .context("client-service failed to start")?;
    let port = app.port();
    spawn(app.run_until_stopped());
    Ok(port)
}

async fn spawn_products() -> Result<u16> {
    use product_service::config::{DatabaseConfig, ProductConfig};

    let config = ProductConfig {
        common: ephemeral(),
        database: DatabaseConfig {
            url: unused_url("postgres"),
            max_connections: 1,
            min_connections: 0,
        },
    };
    let repo = product_service::services::InMemoryProductRepository::new();
    let state = product_service::startup::AppState::new(Arc::new(repo));
    let app = product_service::startup::Application::build_with_state(config, state)
        .await
        .context("product-service failed to start")?;
    let port = app.port();
    spawn(app.run_until_stopped());
    Ok(port)
}

async fn spawn_inventory(product_port: u16) -> Result<u16> {
    use inventory_service::config::{DatabaseConfig, InventoryConfig};

    let product_service = ServiceClientConfig::new(local(product_port));
    let config = InventoryConfig {
        common: ephemeral(),
        database: DatabaseConfig {
            url: unused_url("postgres"),
            max_connections: 1,
            min_connections: 0,
        },
        product_service: product_service.clone(),
    };
    let products = ProductServiceClient::new(product_service)?;
    let movements = inventory_service::services::InMemoryMovementRepository::new();
    let state = inventory_service::startup::AppState::new(Arc::new(movements), Arc::new(products));
    let app = inventory_service::startup::Application::build_with_state(config, state)
        .await
        .context("inventory-service failed to start")?;
    let port = app.port();
    spawn(app.run_until_stopped());
    Ok(port)
}

async fn spawn_sales(client_port: u16, product_port: u16, inventory_port: u16) -> Result<u16> {
    use sale_service::config::{MongoConfig, SaleConfig};

    let config = SaleConfig {
        common: ephemeral(),
        mongodb: MongoConfig {
            uri: unused_url("mongodb"),
            database: "sales".to_string(),
        },
        client_service: ServiceClientConfig::new(local(client_port)),
        product_service: ServiceClientConfig::new(local(product_port)),
        inventory_service: ServiceClientConfig::new(local(inventory_port)),
    };
    let sales = sale_service::services::InMemorySaleRepository::new();
    let state = sale_service::startup::AppState::with_remote_services(Arc::new(sales), &config)?;
    let app = sale_service::startup::Application::build_with_state(config, state)
        .await
        .context("sale-service failed to start")?;
    let port = app.port();
    spawn(app.run_until_stopped());
    Ok(port)
}
