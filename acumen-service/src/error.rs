//! Error types for the wallet service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the wallet service handlers.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The supplied address is not a well-formed EVM address.
    #[error("invalid address {0:?}")]
    InvalidAddress(String),

    /// A chain identifier in the request is not supported.
    #[error(transparent)]
    ChainNotFound(#[from] acumen::chain::ChainNotFoundError),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidAddress(_) | Self::ChainNotFound(_) => StatusCode::BAD_REQUEST,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
