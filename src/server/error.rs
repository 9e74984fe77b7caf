use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::StoreError;

/// HTTP-facing error wrapper around the store taxonomy.
#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    NotFound,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> ApiError {
        ApiError::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not found".to_owned()),
            ApiError::Store(err @ StoreError::Validation { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            ApiError::Store(err @ StoreError::Conflict(_)) => {
                (StatusCode::CONFLICT, err.to_string())
            }
            ApiError::Store(StoreError::Storage(err)) => {
                // Opaque towards the client; details only in the log.
                tracing::error!("storage failure: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_owned(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
