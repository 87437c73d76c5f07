use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

use crate::embedding::EmbedError;
use crate::generation::GenerateError;

/// HTTP-facing error for the request path.
///
/// Collaborators keep their own typed errors; this enum is the final
/// mapping onto a status code and an `{"error": ...}` JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("retrieval failed: {0}")]
    Retrieval(String),
    #[error("generation failed: {0}")]
    Generation(String),
}

impl From<EmbedError> for ApiError {
    fn from(err: EmbedError) -> Self {
        ApiError::Retrieval(err.to_string())
    }
}

impl From<GenerateError> for ApiError {
    fn from(err: GenerateError) -> Self {
        ApiError::Generation(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Retrieval(msg) | ApiError::Generation(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
