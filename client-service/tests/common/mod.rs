#![allow(dead_code)]

use client_service::config::{ClientConfig, DatabaseConfig};
use client_service::services::InMemoryClientRepository;
use client_service::startup::{AppState, Application};
use reqwest::{Client, RequestBuilder};
use secrecy::Secret;
use serde_json::{Value, json};
use service_core::config::Config;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub client: Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let config = ClientConfig {
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
        let state = AppState::new(Arc::new(InMemoryClientRepository::new()));

        let app = Application::build_with_state(config, state)
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        Self {
            address,
            client: Client::new(),
        }
    }

    pub fn as_staff(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("user", "ana").header("roles", "ROLE_ADMIN")
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, document_number: &str) -> reqwest::Response {
        self.as_staff(self.client.post(self.url("/api/clients")))
            .json(&client_body(document_number))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

pub fn client_body(document_number: &str) -> Value {
    json!({
        "givenName": "Ana",
        "familyName": "Torres",
        "documentType": "DNI",
        "documentNumber": document_number,
        "birthDate": "1990-04-02"
    })
}
