//! API error responses: `{"detail": "..."}` with a mapped status code

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crew_application::{IngestionError, ReviewError};
use serde_json::json;
use tracing::{error, warn};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }
}

impl From<IngestionError> for ApiError {
    fn from(err: IngestionError) -> Self {
        let status = if err.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::BAD_REQUEST
        };
        Self::new(status, err.to_string())
    }
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::Ingestion(e) => e.into(),
            ReviewError::Pipeline(e) => Self::new(StatusCode::BAD_GATEWAY, e.to_string()),
            ReviewError::Write(e) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{}: {}", self.status, self.detail);
        } else {
            warn!("{}: {}", self.status, self.detail);
        }
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
