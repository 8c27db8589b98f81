#![allow(dead_code)]

use gateway_service::config::{GatewayConfig, JwtConfig, RateLimitConfig, RouteConfig};
use gateway_service::startup::Application;
use reqwest::{Client, RequestBuilder};
use secrecy::Secret;
use service_core::auth::{JwtService, Role};
use service_core::config::Config;
use wiremock::MockServer;

pub const TEST_SECRET: &str = "gateway-test-secret";
pub const TEST_ISSUER: &str = "retail-back-office";

pub struct TestApp {
    pub address: String,
    /// Stands in for every upstream except inventory, which points nowhere.
    pub upstream: MockServer,
    pub client: Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_rate_limit(1000).await
    }

    pub async fn spawn_with_rate_limit(attempts: u32) -> Self {
        let upstream = MockServer::start().await;
        let route = |prefix: &str, service: &str, upstream: &str| RouteConfig {
            prefix: prefix.to_string(),
            service: service.to_string(),
            upstream: upstream.to_string(),
        };

        let config = GatewayConfig {
            common: Config {
                port: 0,
                ..Config::default()
            },
            jwt: JwtConfig {
                secret: Secret::new(TEST_SECRET.to_string()),
                issuer: TEST_ISSUER.to_string(),
            },
            routes: vec![
                route("/api/auth", "auth-service", &upstream.uri()),
                route("/api/clients", "client-service", &upstream.uri()),
                route("/api/products", "product-service", &upstream.uri()),
                route("/api/sales", "sale-service", &upstream.uri()),
                route("/api/inventory", "inventory-service", "http://127.0.0.1:1"),
            ],
            upstream_timeout_secs: 2,
            max_body_bytes: 64 * 1024,
            rate_limit: RateLimitConfig {
                attempts,
                window_seconds: 60,
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        Self {
            address,
            upstream,
            client: Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }
}

pub fn token_for(username: &str, roles: &[Role]) -> String {
    JwtService::new(TEST_SECRET, TEST_ISSUER, 30)
        .issue(username, roles)
        .expect("Failed to issue test token")
}

pub fn staff_token() -> String {
    token_for("ana", &[Role::User])
}
