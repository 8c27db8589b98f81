#![allow(dead_code)]

use reqwest::{Client, RequestBuilder};
use sale_service::config::{MongoConfig, SaleConfig};
use sale_service::services::InMemorySaleRepository;
use sale_service::startup::{AppState, Application};
use secrecy::Secret;
use serde_json::json;
use service_core::clients::ServiceClientConfig;
use service_core::config::Config;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct TestApp {
    pub address: String,
    pub sales: InMemorySaleRepository,
    /// Answers for client-service, product-service and inventory-service.
    pub downstream: MockServer,
    pub client: Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let downstream = MockServer::start().await;
        let sales = InMemorySaleRepository::new();

        let remote = ServiceClientConfig::new(downstream.uri());
        let config = SaleConfig {
            common: Config {
                port: 0,
                ..Config::default()
            },
            mongodb: MongoConfig {
                uri: Secret::new("mongodb://unused".to_string()),
                database: "sales_test".to_string(),
            },
            client_service: remote.clone(),
            product_service: remote.clone(),
            inventory_service: remote,
        };

        let state = AppState::with_remote_services(Arc::new(sales.clone()), &config)
            .expect("Failed to build downstream clients");
        let app = Application::build_with_state(config, state)
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        Self {
            address,
            sales,
            downstream,
            client: Client::new(),
        }
    }

    pub async fn mock_client(&self, id: i64, given: &str, family: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/api/clients/{}", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": id,
                "givenName": given,
                "familyName": family,
                "documentType": "DNI",
                "documentNumber": "12345678",
                "birthDate": "1990-04-02"
            })))
            .mount(&self.downstream)
            .await;
    }

    pub async fn mock_product(&self, id: i64, price: f64, stock: i64) {
        Mock::given(method("GET"))
            .and(path(format!("/api/products/{}", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": id,
                "name": format!("Product {}", id),
                "description": "Shelf item",
                "price": price,
                "active": true,
                "createdAt": "2024-01-10",
                "stock": stock
            })))
            .mount(&self.downstream)
            .await;
    }

    pub fn as_staff(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("user", "ana").header("roles", "ROLE_USER")
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

pub fn movement_json(product_id: i64, quantity: i64) -> serde_json::Value {
    json!({
        "id": 1,
        "productId": product_id,
        "quantity": quantity,
        "movementType": "SALIDA",
        "registeredAt": "2024-05-01T10:00:00Z"
    })
}
