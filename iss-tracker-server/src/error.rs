//! Mapping of engine failures onto HTTP responses

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use iss_tracker_core::TrackerError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Tracker(e) => match e {
                TrackerError::DatasetUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                TrackerError::EpochNotFound(_) => StatusCode::NOT_FOUND,
                TrackerError::InvalidQueryParameter { .. } => StatusCode::BAD_REQUEST,
                TrackerError::LoadFailed(_) => StatusCode::BAD_GATEWAY,
                TrackerError::InvalidRecord { .. } | TrackerError::InvalidDataset(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Tracker(e) => e.kind(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        let body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
