pub mod shutdown;
pub mod validation;

pub use shutdown::shutdown_signal;
pub use validation::{JsonBody, ValidatedJson, is_blank, is_not_positive, is_valid_national_id};
