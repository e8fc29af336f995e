use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Failure of a download or probe request.
///
/// Every variant is reported to the client as `200 OK` with an `{"error": ...}`
/// body; the kind only drives logging and the message wording.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Unsupported format: {0}")]
    InvalidFormat(String),

    #[error("Download failed: {0}")]
    EngineFailure(String),

    #[error("No .{0} file found after download")]
    NotFound(String),

    #[error("No files were downloaded")]
    EmptyResult,

    #[error("Failed to fetch video info: {0}")]
    ProbeFailure(String),

    #[error("Download failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for DownloadError {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
