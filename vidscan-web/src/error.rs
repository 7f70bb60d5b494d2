use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use vidscan_core::error::VidError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] VidError),

    #[error("missing or malformed x-session-id header")]
    MissingSession,

    #[error("unknown session")]
    UnknownSession,

    #[error("worker failed: {0}")]
    Worker(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(VidError::Pattern { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Core(
                VidError::DatasetMissing(_)
                | VidError::NoActivePage
                | VidError::ExportOverwritesDataset(_),
            ) => StatusCode::CONFLICT,
            ApiError::Core(VidError::DownloadStatus(_) | VidError::Http(_)) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::Core(_) | ApiError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MissingSession => StatusCode::BAD_REQUEST,
            ApiError::UnknownSession => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!(%status, %message, "request failed");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}
