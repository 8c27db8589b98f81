#![allow(dead_code)]

use auth_service::config::{AuthConfig, DatabaseConfig, JwtConfig, RateLimitConfig};
use auth_service::services::InMemoryUserRepository;
use auth_service::startup::{AppState, Application};
use reqwest::{Client, Response};
use secrecy::Secret;
use serde_json::json;
use service_core::auth::JwtService;
use service_core::config::Config;
use std::sync::Arc;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_ISSUER: &str = "retail-back-office";

pub struct TestApp {
    pub address: String,
    pub repo: InMemoryUserRepository,
    pub client: Client,
}

pub fn test_config(login_attempts: u32) -> AuthConfig {
    AuthConfig {
        common: Config {
            port: 0,
            ..Config::default()
        },
        database: DatabaseConfig {
            url: Secret::new("postgres://unused".to_string()),
            max_connections: 1,
            min_connections: 0,
        },
        jwt: JwtConfig {
            secret: Secret::new(TEST_SECRET.to_string()),
            issuer: TEST_ISSUER.to_string(),
            expiry_minutes: 30,
        },
        login_rate_limit: RateLimitConfig {
            attempts: login_attempts,
            window_seconds: 60,
        },
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config(100)).await
    }

    pub async fn spawn_with(config: AuthConfig) -> Self {
        let repo = InMemoryUserRepository::new();
        let state = AppState::new(Arc::new(repo.clone()), &config);
        let app = Application::build_with_state(config, state)
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        Self {
            address,
            repo,
            client: Client::new(),
        }
    }

    pub async fn sign_up(&self, username: &str, password: &str, role_id: i64) -> Response {
        self.client
            .post(self.url("/api/auth/sign-up"))
            .json(&json!({"username": username, "password": password, "roleId": role_id}))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn log_in(&self, username: &str, password: &str) -> Response {
        self.client
            .post(self.url("/api/auth/log-in"))
            .json(&json!({"username": username, "password": password}))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub fn jwt(&self) -> JwtService {
        JwtService::new(TEST_SECRET, TEST_ISSUER, 30)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}
