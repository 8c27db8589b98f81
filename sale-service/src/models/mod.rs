pub mod sale;

pub use sale::{NewSale, RecordedSale, SALE_SORT_KEYS, Sale, SaleDetail};
