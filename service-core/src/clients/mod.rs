//! HTTP clients for calls between back-office services, plus the wire types
//! those calls exchange.
pub mod client_service;
pub mod inventory_service;
pub mod product_service;

pub use client_service::{ClientResponse, ClientServiceClient, DocumentType};
pub use inventory_service::{InventoryServiceClient, MovementKind, MovementRequest, MovementResponse};
pub use product_service::{ProductResponse, ProductServiceClient};

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;
use thiserror::Error;

use crate::auth::CallerIdentity;
use crate::error::{AppError, ErrorBody};
use crate::observability::{TracedRequest, extract_request_id};

/// Where a downstream service lives and how long to wait for it.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceClientConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    5
}

impl ServiceClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub(crate) fn build_http(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// The inbound request's caller and correlation id, forwarded on every call.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub identity: CallerIdentity,
    pub request_id: Option<String>,
}

impl CallContext {
    pub fn new(identity: CallerIdentity) -> Self {
        Self {
            identity,
            request_id: None,
        }
    }

    pub(crate) fn apply(&self, request: TracedRequest) -> TracedRequest {
        request
            .identity(&self.identity)
            .request_id(self.request_id.as_deref())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CallContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = CallerIdentity::from_request_parts(parts, state).await?;
        Ok(Self {
            identity,
            request_id: extract_request_id(&parts.headers),
        })
    }
}

#[derive(Debug, Error)]
pub enum ClientCallError {
    #[error("{service} rejected the request ({status}): {message}")]
    Rejected {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("{service} is unreachable: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned an unreadable response: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl ClientCallError {
    pub(crate) fn transport(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| ClientCallError::Transport { service, source }
    }
}

impl From<ClientCallError> for AppError {
    /// Downstream validation failures keep their status and message; anything
    /// else is an internal failure of this service.
    fn from(err: ClientCallError) -> Self {
        match err {
            ClientCallError::Rejected {
                status: 400,
                message,
                ..
            } => AppError::bad_request(message),
            ClientCallError::Rejected {
                status: 404,
                message,
                ..
            } => AppError::not_found(message),
            other => AppError::InternalError(anyhow::Error::new(other)),
        }
    }
}

/// Decodes a 2xx body, or turns the `{status, message}` error body into `Rejected`.
pub(crate) async fn read_json<T: DeserializeOwned>(
    service: &'static str,
    response: reqwest::Response,
) -> Result<T, ClientCallError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|source| ClientCallError::Decode { service, source });
    }

    let raw = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&raw)
        .map(|body| body.message)
        .unwrap_or(raw);

    Err(ClientCallError::Rejected {
        service,
        status: status.as_u16(),
        message,
    })
}
