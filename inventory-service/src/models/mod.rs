use chrono::{DateTime, Utc};
use service_core::clients::{MovementKind, MovementResponse};
use service_core::pagination::SortKeys;
use sqlx::FromRow;

pub use service_core::clients::MovementRequest;

pub const MOVEMENT_SORT_KEYS: SortKeys = &[
    ("id", "id"),
    ("quantity", "quantity"),
    ("registeredAt", "registered_at"),
];

/// One stored stock movement. Movements are append-only.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Movement {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub movement_type: String,
    pub registered_at: DateTime<Utc>,
}

impl Movement {
    pub fn kind(&self) -> MovementKind {
        MovementKind::parse(&self.movement_type).unwrap_or(MovementKind::Inbound)
    }
}

impl From<Movement> for MovementResponse {
    fn from(m: Movement) -> Self {
        let movement_type = m.kind();
        Self {
            id: m.id,
            product_id: m.product_id,
            quantity: m.quantity,
            movement_type,
            registered_at: m.registered_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewMovement {
    pub product_id: i64,
    pub quantity: i64,
    pub kind: MovementKind,
    pub registered_at: DateTime<Utc>,
}
