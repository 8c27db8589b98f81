use service_core::error::AppError;
use service_core::pagination::PaginationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProductError {
    #[error("Name can't be empty")]
    NameEmpty,

    #[error("Description can't be empty")]
    DescriptionEmpty,

    #[error("The product price cannot be less than or equal to 0")]
    PriceInvalid,

    #[error("The product name already exists")]
    NameExists,

    #[error("The id is invalid")]
    InvalidId,

    #[error("Amount can't be less than or equal to 0")]
    QuantityInvalid,

    #[error("The type of movement is invalid")]
    InvalidTypeMovement,

    #[error("Stock can't be less than or equal to 0")]
    InvalidStock,

    #[error("Stock is too large")]
    StockTooLarge,

    #[error("Product not found")]
    NotFound,

    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound => AppError::NotFound(anyhow::Error::new(err)),
            ProductError::Database(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            ProductError::Pagination(e) => e.into(),
            other => AppError::BadRequest(anyhow::Error::new(other)),
        }
    }
}
