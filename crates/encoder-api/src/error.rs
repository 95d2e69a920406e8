//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use encoder_media::MediaError;
use thiserror::Error;
use tracing::error;

use crate::task::TaskRequestError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(#[from] TaskRequestError),

    #[error("{0}")]
    Media(MediaError),
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::InvalidArguments(msg) => {
                ApiError::BadRequest(TaskRequestError::InvalidArguments(msg))
            }
            other => ApiError::Media(other),
        }
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Media(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Plain-text body in the `ERROR: <reason>` form.
    fn body(&self) -> String {
        match self {
            ApiError::BadRequest(e) => format!("ERROR: {}: {}\n", e.kind(), e),
            ApiError::Media(e) => format!("ERROR: {}\n", e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Media(e) = &self {
            error!("Task execution fault: {}", e);
        }

        (self.status_code(), self.body()).into_response()
    }
}
