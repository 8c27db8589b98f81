/// `outcome` is `success`, `invalid_credentials` or `error`.
pub fn record_login(outcome: &'static str) {
    metrics::counter!("auth_logins_total", "outcome" => outcome).increment(1);
}

pub fn record_registration() {
    metrics::counter!("auth_registrations_total").increment(1);
}
