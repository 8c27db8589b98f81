use std::time::Duration;

pub fn record_client_registered() {
    metrics::counter!("clients_registered_total").increment(1);
}

pub fn record_lookup(outcome: &'static str) {
    metrics::counter!("client_lookups_total", "outcome" => outcome).increment(1);
}

pub fn record_db_query(operation: &'static str, elapsed: Duration) {
    metrics::histogram!("client_db_query_duration_seconds", "operation" => operation)
        .record(elapsed.as_secs_f64());
}
