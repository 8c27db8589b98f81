use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CallContext, ClientCallError, ServiceClientConfig, read_json};
use crate::observability::TracedClientExt;

const SERVICE: &str = "inventory-service";

/// Direction of a stock movement. Stored and sent as `ENTRADA` / `SALIDA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementKind {
    #[serde(rename = "ENTRADA", alias = "INBOUND")]
    Inbound,
    #[serde(rename = "SALIDA", alias = "OUTBOUND")]
    Outbound,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Inbound => "ENTRADA",
            MovementKind::Outbound => "SALIDA",
        }
    }

    /// Case-insensitive; accepts both the stored names and `INBOUND` / `OUTBOUND`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ENTRADA" | "INBOUND" => Some(MovementKind::Inbound),
            "SALIDA" | "OUTBOUND" => Some(MovementKind::Outbound),
            _ => None,
        }
    }

    /// Signed change this movement applies to stock.
    pub fn delta(&self, quantity: i64) -> i64 {
        match self {
            MovementKind::Inbound => quantity,
            MovementKind::Outbound => -quantity,
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRequest {
    pub product_id: Option<i64>,
    pub quantity: Option<i64>,
    pub movement_type: Option<String>,
}

impl MovementRequest {
    pub fn outbound(product_id: i64, quantity: i64) -> Self {
        Self {
            product_id: Some(product_id),
            quantity: Some(quantity),
            movement_type: Some(MovementKind::Outbound.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementResponse {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub movement_type: MovementKind,
    pub registered_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct InventoryServiceClient {
    http: reqwest::Client,
    config: ServiceClientConfig,
}

impl InventoryServiceClient {
    pub fn new(config: ServiceClientConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: config.build_http()?,
            config,
        })
    }

    #[tracing::instrument(skip(self, ctx))]
    pub async fn register_movement(
        &self,
        ctx: &CallContext,
        movement: &MovementRequest,
    ) -> Result<MovementResponse, ClientCallError> {
        let url = self.config.url("/api/inventory");
        let response = ctx
            .apply(self.http.traced_post(&url).json(movement))
            .send()
            .await
            .map_err(ClientCallError::transport(SERVICE))?;

        read_json(SERVICE, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_kind_parses_both_vocabularies() {
        assert_eq!(MovementKind::parse("salida"), Some(MovementKind::Outbound));
        assert_eq!(MovementKind::parse(" OUTBOUND "), Some(MovementKind::Outbound));
        assert_eq!(MovementKind::parse("Entrada"), Some(MovementKind::Inbound));
        assert_eq!(MovementKind::parse("transfer"), None);
    }

    #[test]
    fn outbound_delta_is_negative() {
        assert_eq!(MovementKind::Outbound.delta(4), -4);
        assert_eq!(MovementKind::Inbound.delta(4), 4);
    }
}
