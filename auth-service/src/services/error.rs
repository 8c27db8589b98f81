use service_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Username can't be empty")]
    UsernameEmpty,

    #[error("Password can't be empty")]
    PasswordEmpty,

    #[error("The id is invalid")]
    InvalidId,

    #[error("Role not found")]
    RoleNotFound,

    #[error("The username already exists")]
    UsernameExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Database(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            AuthError::Internal(e) => AppError::InternalError(e),
            AuthError::InvalidCredentials => {
                AppError::Unauthorized(anyhow::anyhow!("Invalid credentials"))
            }
            other => AppError::BadRequest(anyhow::Error::new(other)),
        }
    }
}
