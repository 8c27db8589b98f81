#![allow(dead_code)]

use chrono::NaiveDate;
use product_service::config::{DatabaseConfig, ProductConfig};
use product_service::models::{NewProduct, Product};
use product_service::services::InMemoryProductRepository;
use product_service::startup::{AppState, Application};
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use secrecy::Secret;
use service_core::config::Config;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub repo: InMemoryProductRepository,
    pub client: Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let repo = InMemoryProductRepository::new();
        let config = ProductConfig {
            common: Config {
                port: 0,
                ..Config::default()
            },
            database: DatabaseConfig {
                url: Secret::new("postgres://unused".to_string()),
                max_connections: 1,
                min_connections: 0,
            },
        };

        let app = Application::build_with_state(config, AppState::new(Arc::new(repo.clone())))
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

    pub async fn seed(&self, name: &str, price: Decimal, stock: i64) -> Product {
        self.repo
            .seed(
                NewProduct {
                    name: name.to_string(),
                    description: format!("{} description", name),
                    price,
                    created_at: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                },
                stock,
            )
            .await
    }

    /// Request carrying the headers the gateway injects for a staff member.
    pub fn as_staff(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("user", "ana").header("roles", "ROLE_USER")
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}
