//! HTTP error responses.

use crate::error::SmartSpeakError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

pub const BAD_REQUEST_MESSAGE: &str = "No audio file or required models are missing";
pub const INTERNAL_MESSAGE: &str = "An internal server error occurred.";

#[derive(Debug)]
pub enum ApiError {
    /// Missing or unreadable `audio` field, or no transcriber loaded.
    BadRequest,
    /// Upload exceeded the configured body limit.
    PayloadTooLarge,
    /// The pipeline failed.
    Internal(SmartSpeakError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest => write!(f, "Bad request: {BAD_REQUEST_MESSAGE}"),
            ApiError::PayloadTooLarge => write!(f, "Payload too large"),
            ApiError::Internal(e) => write!(f, "Internal error: {e}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest => {
                tracing::warn!("Rejected analyze request: {}", BAD_REQUEST_MESSAGE);
                (StatusCode::BAD_REQUEST, json!({ "error": BAD_REQUEST_MESSAGE }))
            }
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({ "error": "Uploaded file is too large" }),
            ),
            ApiError::Internal(e) => {
                tracing::error!(error = ?e, "Analysis failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": INTERNAL_MESSAGE, "details": e.to_string() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<SmartSpeakError> for ApiError {
    fn from(err: SmartSpeakError) -> Self {
        match err {
            SmartSpeakError::TranscriberUnavailable => ApiError::BadRequest,
            other => ApiError::Internal(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_transcriber_maps_to_bad_request() {
        let err: ApiError = SmartSpeakError::TranscriberUnavailable.into();
        assert!(matches!(err, ApiError::BadRequest));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn pipeline_failures_map_to_internal_error() {
        let err: ApiError = SmartSpeakError::AudioDecode {
            message: "bad header".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Internal error: Audio decode failed: bad header");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn oversized_upload_maps_to_413() {
        assert_eq!(
            ApiError::PayloadTooLarge.into_response().status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }
}
