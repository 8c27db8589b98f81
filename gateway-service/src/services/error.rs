use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("No route for {0}")]
    NoRoute(String),

    #[error("{service} is unavailable")]
    Unreachable {
        service: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request body could not be read")]
    Body(#[source] axum::Error),

    #[error("Upstream response could not be read")]
    UpstreamBody(#[source] reqwest::Error),
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::MissingToken => AppError::Unauthorized(anyhow::Error::new(err)),
            GatewayError::InvalidToken(source) => AppError::InvalidToken(source),
            GatewayError::NoRoute(_) => AppError::NotFound(anyhow::Error::new(err)),
            GatewayError::Body(_) => AppError::BadRequest(anyhow::Error::new(err)),
            GatewayError::Unreachable { .. } | GatewayError::UpstreamBody(_) => {
                tracing::warn!(error = ?err, "Upstream call failed");
                AppError::BadGateway(err.to_string())
            }
        }
    }
}
