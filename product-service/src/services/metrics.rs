//! Domain metrics for product-service.

use service_core::clients::MovementKind;
use std::time::Duration;

pub fn record_product_created() {
    metrics::counter!("products_created_total").increment(1);
}

/// `outcome` is `applied`, `insufficient` or `missing`.
pub fn record_stock_update(kind: MovementKind, outcome: &'static str) {
    metrics::counter!(
        "product_stock_updates_total",
        "movement" => kind.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_db_query(operation: &'static str, elapsed: Duration) {
    metrics::histogram!("product_db_query_duration_seconds", "operation" => operation)
        .record(elapsed.as_secs_f64());
}
