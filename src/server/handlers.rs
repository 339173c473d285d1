//! Route handlers.

use crate::analysis::report::AnalysisResult;
use crate::error::SmartSpeakError;
use crate::server::AppState;
use crate::server::error::ApiError;
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
};
use serde::Serialize;

/// Multipart field carrying the recording.
pub const AUDIO_FIELD: &str = "audio";

/// POST /analyze
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    if !state.pipeline.engines().transcriber_ready() {
        return Err(ApiError::BadRequest);
    }
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "Request is not multipart");
        ApiError::BadRequest
    })?;

    let audio = read_audio_field(&mut multipart).await?;
    tracing::info!(bytes = audio.len(), "Received recording");

    let analysis = tokio::time::timeout(state.request_timeout, state.pipeline.analyze(&audio))
        .await
        .map_err(|_| SmartSpeakError::Timeout {
            seconds: state.request_timeout.as_secs(),
        })??;

    Ok(Json(analysis.into_result()))
}

async fn read_audio_field(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    loop {
        let field = multipart.next_field().await.map_err(field_error)?;
        let Some(field) = field else {
            return Err(ApiError::BadRequest);
        };
        if field.name() == Some(AUDIO_FIELD) {
            let bytes = field.bytes().await.map_err(field_error)?;
            return Ok(bytes.to_vec());
        }
    }
}

fn field_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        tracing::debug!(error = %e, "Malformed multipart body");
        ApiError::BadRequest
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub transcriber: bool,
    pub sentiment: bool,
    pub storage: bool,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let engines = state.pipeline.engines();
    Json(HealthResponse {
        status: "ok",
        version: crate::version_string(),
        transcriber: engines.transcriber_ready(),
        sentiment: engines.sentiment.is_some(),
        storage: engines.blob_store.is_some(),
    })
}
