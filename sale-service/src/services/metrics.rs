use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// `outcome` is `recorded` or `rejected`.
pub fn record_sale(outcome: &'static str) {
    metrics::counter!("sales_total", "outcome" => outcome).increment(1);
}

pub fn record_sale_amount(total: Decimal) {
    metrics::histogram!("sale_amount").record(total.to_f64().unwrap_or_default());
}

/// Debits are not retried, so `failed` here means stock and sales disagree.
pub fn record_stock_debit(outcome: &'static str) {
    metrics::counter!("sale_stock_debits_total", "outcome" => outcome).increment(1);
}
