use chrono::Utc;
use service_core::clients::{CallContext, MovementKind, MovementRequest};
use service_core::pagination::{Page, Paging};
use service_core::utils::{is_blank, is_not_positive};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::error::InventoryError;
use super::metrics::{record_movement, record_movement_quantity};
use super::products::ProductGateway;
use super::repository::MovementRepository;
use crate::models::{MOVEMENT_SORT_KEYS, Movement, NewMovement};

#[derive(Clone)]
pub struct InventoryService {
    movements: Arc<dyn MovementRepository>,
    products: Arc<dyn ProductGateway>,
}

/// A movement request whose fields all passed validation.
struct ValidMovement {
    product_id: i64,
    quantity: i64,
    kind: MovementKind,
}

fn validate(request: &MovementRequest) -> Result<ValidMovement, InventoryError> {
    if is_not_positive(request.quantity) {
        return Err(InventoryError::AmountInvalid);
    }
    if is_blank(request.movement_type.as_deref()) {
        return Err(InventoryError::InvalidTypeMovement);
    }
    let kind = request
        .movement_type
        .as_deref()
        .and_then(MovementKind::parse)
        .ok_or(InventoryError::InvalidTypeMovement)?;
    if is_not_positive(request.product_id) {
        return Err(InventoryError::InvalidId);
    }

    Ok(ValidMovement {
        product_id: request.product_id.unwrap_or_default(),
        quantity: request.quantity.unwrap_or_default(),
        kind,
    })
}

impl InventoryService {
    pub fn new(movements: Arc<dyn MovementRepository>, products: Arc<dyn ProductGateway>) -> Self {
        Self {
            movements,
            products,
        }
    }

    /// Applies the stock change on the product, then appends the movement.
    ///
    /// The two writes live in different services; if the append fails after the
    /// stock changed, the product keeps the new stock with no movement recorded.
    #[instrument(skip(self, ctx), fields(user = %ctx.identity.username))]
    pub async fn register_movement(
        &self,
        ctx: &CallContext,
        request: &MovementRequest,
    ) -> Result<Movement, InventoryError> {
        let movement = validate(request)?;

        let product = self
            .products
            .find_product(ctx, movement.product_id)
            .await?
            .ok_or(InventoryError::ProductNotFound)?;

        if movement.kind == MovementKind::Outbound && product.stock <= 0 {
            record_movement(movement.kind, "rejected");
            warn!(product_id = product.id, "Outbound movement on product without stock");
            return Err(InventoryError::MovementWithoutStock);
        }

        let updated = self
            .products
            .update_stock(ctx, movement.product_id, movement.quantity, movement.kind)
            .await
            .inspect_err(|e| {
                record_movement(movement.kind, "rejected");
                warn!(product_id = movement.product_id, error = %e, "Stock update refused");
            })?;

        let stored = self
            .movements
            .append(NewMovement {
                product_id: movement.product_id,
                quantity: movement.quantity,
                kind: movement.kind,
                registered_at: Utc::now(),
            })
            .await
            .inspect_err(|e| {
                record_movement(movement.kind, "failed");
                error!(
                    product_id = movement.product_id,
                    quantity = movement.quantity,
                    movement = %movement.kind,
                    error = %e,
                    "Stock changed but movement was not recorded"
                );
            })?;

        record_movement(movement.kind, "recorded");
        record_movement_quantity(movement.kind, movement.quantity);
        info!(
            movement_id = stored.id,
            product_id = stored.product_id,
            movement = %movement.kind,
            quantity = stored.quantity,
            stock = updated.stock,
            "Movement recorded"
        );
        Ok(stored)
    }

    #[instrument(skip(self))]
    pub async fn list_movements(
        &self,
        product_id: i64,
        paging: &Paging,
    ) -> Result<Page<Movement>, InventoryError> {
        let request = paging.validate(MOVEMENT_SORT_KEYS)?;
        if product_id <= 0 {
            return Err(InventoryError::InvalidId);
        }
        let (items, total) = self.movements.list_for_product(product_id, &request).await?;
        Ok(Page::new(items, &request, total))
    }

    pub async fn ping(&self) -> Result<(), InventoryError> {
        self.movements.ping().await
    }
}
