use service_core::clients::MovementKind;

/// `outcome` is `recorded`, `rejected` or `failed`.
pub fn record_movement(kind: MovementKind, outcome: &'static str) {
    metrics::counter!(
        "inventory_movements_total",
        "movement" => kind.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_movement_quantity(kind: MovementKind, quantity: i64) {
    metrics::histogram!("inventory_movement_quantity", "movement" => kind.as_str())
        .record(quantity as f64);
}
