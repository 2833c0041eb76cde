use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::ErrorResponse;
use thiserror::Error;
use crate::auth::AuthError;
use crate::filter::InvalidDate;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    #[error(transparent)]
    BadRequest(#[from] InvalidDate),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(e) => {
                tracing::error!("Metrics query failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
