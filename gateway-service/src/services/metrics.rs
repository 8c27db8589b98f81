use std::time::Duration;

pub fn record_proxied(service: &str, status: u16, elapsed: Duration) {
    let labels = [
        ("service", service.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("gateway_requests_total", &labels).increment(1);
    metrics::histogram!("gateway_upstream_duration_seconds", "service" => service.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_rejected(reason: &'static str) {
    metrics::counter!("gateway_rejected_total", "reason" => reason).increment(1);
}
