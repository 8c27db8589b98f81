#![allow(dead_code)]

use inventory_service::config::{DatabaseConfig, InventoryConfig};
use inventory_service::services::InMemoryMovementRepository;
use inventory_service::startup::{AppState, Application};
use reqwest::{Client, RequestBuilder};
use secrecy::Secret;
use serde_json::{Value, json};
use service_core::clients::{ProductServiceClient, ServiceClientConfig};
use service_core::config::Config;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct TestApp {
    pub address: String,
    pub movements: InMemoryMovementRepository,
    pub product_service: MockServer,
    pub client: Client,
}

impl TestApp {
    /// Spawns the service against in-memory movements and a mocked product-service.
    pub async fn spawn() -> Self {
        let product_service = MockServer::start().await;
        let movements = InMemoryMovementRepository::new();

        let product_config = ServiceClientConfig::new(product_service.uri());
        let config = InventoryConfig {
            common: Config {
                port: 0,
                ..Config::default()
            },
            database: DatabaseConfig {
                url: Secret::new("postgres://unused".to_string()),
                max_connections: 1,
                min_connections: 0,
            },
            product_service: product_config.clone(),
        };

        let products = ProductServiceClient::new(product_config).expect("Failed to build client");
        let state = AppState::new(Arc::new(movements.clone()), Arc::new(products));
        let app = Application::build_with_state(config, state)
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        Self {
            address,
            movements,
            product_service,
            client: Client::new(),
        }
    }

    /// Mounts `GET /api/products/{id}` answering with the given stock.
    pub async fn mock_product(&self, id: i64, stock: i64) {
        Mock::given(method("GET"))
            .and(path(format!("/api/products/{}", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(product_json(id, stock)))
            .mount(&self.product_service)
            .await;
    }

    pub async fn mock_missing_product(&self, id: i64) {
        Mock::given(method("GET"))
            .and(path(format!("/api/products/{}", id)))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"status": 404, "message": "Product not found"})),
            )
            .mount(&self.product_service)
            .await;
    }

    pub fn as_staff(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("user", "ana").header("roles", "ROLE_USER")
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

pub fn product_json(id: i64, stock: i64) -> Value {
    json!({
        "id": id,
        "name": "Coffee",
        "description": "Ground coffee 500g",
        "price": 5.0,
        "active": true,
        "createdAt": "2024-01-10",
        "stock": stock
    })
}
