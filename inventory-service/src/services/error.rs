use service_core::clients::ClientCallError;
use service_core::error::AppError;
use service_core::pagination::PaginationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("The amount is invalid")]
    AmountInvalid,

    #[error("The type of movement is invalid")]
    InvalidTypeMovement,

    #[error("The id is invalid")]
    InvalidId,

    #[error("The product is invalid")]
    ProductNotFound,

    #[error("There is no stock for the product")]
    MovementWithoutStock,

    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error(transparent)]
    Downstream(#[from] ClientCallError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::Database(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            InventoryError::Pagination(e) => e.into(),
            InventoryError::Downstream(e) => e.into(),
            other => AppError::BadRequest(anyhow::Error::new(other)),
        }
    }
}
