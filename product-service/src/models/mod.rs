pub mod product;

pub use product::{NewProduct, PRODUCT_SORT_KEYS, Product, ProductChanges, StockUpdate};
