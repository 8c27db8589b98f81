use service_core::clients::ClientCallError;
use service_core::error::AppError;
use service_core::pagination::PaginationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaleError {
    #[error("Client id invalid")]
    ClientIdInvalid,

    #[error("Client not found")]
    ClientNotFound,

    #[error("Details invalid")]
    DetailsInvalid,

    #[error("Quantity invalid")]
    QuantityInvalid,

    #[error("Product id invalid")]
    ProductIdInvalid,

    #[error("Product repeated")]
    ProductRepeated,

    #[error("Product not found")]
    ProductNotFound,

    #[error("Quantity is greater than stock")]
    QuantityGreaterThanStock,

    #[error("Price invalid")]
    PriceInvalid,

    #[error("Sale amount is too large")]
    AmountTooLarge,

    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error(transparent)]
    Downstream(#[from] ClientCallError),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl From<SaleError> for AppError {
    fn from(err: SaleError) -> Self {
        match err {
            SaleError::Database(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            SaleError::ClientNotFound => AppError::not_found(SaleError::ClientNotFound.to_string()),
            SaleError::Pagination(e) => e.into(),
            SaleError::Downstream(e) => e.into(),
            other => AppError::BadRequest(anyhow::Error::new(other)),
        }
    }
}
