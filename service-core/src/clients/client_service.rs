use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::{CallContext, ClientCallError, ServiceClientConfig, read_json};
use crate::observability::TracedClientExt;

const SERVICE: &str = "client-service";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "DNI")]
    Dni,
    #[serde(rename = "PASAPORTE")]
    Passport,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Dni => "DNI",
            DocumentType::Passport => "PASAPORTE",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DNI" => Ok(DocumentType::Dni),
            "PASAPORTE" | "PASSPORT" => Ok(DocumentType::Passport),
            other => Err(format!("Invalid document type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    pub id: i64,
    pub given_name: String,
    pub family_name: String,
    pub document_type: DocumentType,
    pub document_number: String,
    pub birth_date: NaiveDate,
}

impl ClientResponse {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }
}

#[derive(Clone)]
pub struct ClientServiceClient {
    http: reqwest::Client,
    config: ServiceClientConfig,
}

impl ClientServiceClient {
    pub fn new(config: ServiceClientConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: config.build_http()?,
            config,
        })
    }

    /// `None` when client-service answers 404.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn find_client(
        &self,
        ctx: &CallContext,
        id: i64,
    ) -> Result<Option<ClientResponse>, ClientCallError> {
        let url = self.config.url(&format!("/api/clients/{}", id));
        let response = ctx
            .apply(self.http.traced_get(&url))
            .send()
            .await
            .map_err(ClientCallError::transport(SERVICE))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(SERVICE, response).await.map(Some)
    }
}
