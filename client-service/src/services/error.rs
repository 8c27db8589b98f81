use service_core::error::AppError;
use service_core::pagination::PaginationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid ID")]
    InvalidId,

    #[error("Name cannot be null or empty")]
    InvalidName,

    #[error("Last name cannot be null or empty")]
    InvalidLastName,

    #[error("Invalid document number")]
    InvalidDocumentNumber,

    #[error("Invalid document type")]
    InvalidDocumentType,

    #[error("Invalid birth date")]
    InvalidBirthDate,

    #[error("Client not found")]
    NotFound,

    #[error("The document number exists")]
    DocumentNumberExists,

    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound => AppError::NotFound(anyhow::Error::new(err)),
            ClientError::Database(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            ClientError::Pagination(e) => e.into(),
            other => AppError::BadRequest(anyhow::Error::new(other)),
        }
    }
}
