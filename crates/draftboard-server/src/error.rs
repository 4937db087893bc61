use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use draftboard_store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Upload too large: {size} bytes (max {max})")]
    UploadTooLarge { size: usize, max: usize },

    #[error("Invalid or missing bearer token")]
    Unauthorized,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::UploadTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, self.to_string())
            }
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ServerError::Storage(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
            ServerError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
