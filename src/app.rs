//! Composition root: turns a [`Config`] into running engines.

use crate::analysis::report::AnalysisResult;
use crate::analysis::stft::StftPitchTracker;
use crate::audio::WavNormalizer;
use crate::config::Config;
use crate::models::catalog::get_model;
use crate::models::download::{download_model, is_model_installed, model_path};
use crate::pipeline::{EngineContext, Pipeline};
use crate::sentiment::HuggingFaceSentimentScorer;
use crate::server::{AppState, RouterOptions, build_router, serve};
use crate::storage::CloudinaryStore;
use crate::stt::Transcriber;
use crate::stt::whisper::{WhisperConfig, WhisperTranscriber};
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;

/// Build every engine the configuration asks for.
///
/// A transcriber that cannot be loaded is logged and left out; the server
/// still starts and answers `/analyze` with 400 until it is fixed.
pub async fn build_engines(config: &Config, allow_download: bool) -> anyhow::Result<EngineContext> {
    let mut engines = EngineContext::new(Arc::new(WavNormalizer), Arc::new(StftPitchTracker::default()))
        .with_upload_folder(config.storage.folder.clone())
        .with_temp_dir(config.server.temp_dir.clone());

    match load_transcriber(config, allow_download).await {
        Ok(transcriber) => {
            tracing::info!(model = transcriber.model_name(), "Transcription model loaded");
            engines = engines.with_transcriber(transcriber);
        }
        Err(e) => tracing::error!("Could not load transcription model: {:#}", e),
    }

    if config.sentiment.enabled {
        let mut scorer =
            HuggingFaceSentimentScorer::new(&config.sentiment.endpoint, config.sentiment.timeout()?)?;
        if let Some(token) = &config.sentiment.api_token {
            scorer = scorer.with_api_token(token.clone());
        }
        tracing::info!(endpoint = scorer.endpoint(), "Sentiment scoring enabled");
        engines = engines.with_sentiment(Arc::new(scorer));
    } else {
        tracing::info!("Sentiment scoring disabled, confidence defaults to 50");
    }

    match config.storage.credentials() {
        Some(credentials) => {
            tracing::info!(cloud = %credentials.cloud_name, "Clip uploads enabled");
            engines = engines.with_blob_store(Arc::new(CloudinaryStore::new(credentials)));
        }
        None => tracing::info!("No storage credentials, clip uploads disabled"),
    }

    Ok(engines)
}

async fn load_transcriber(
    config: &Config,
    allow_download: bool,
) -> anyhow::Result<Arc<dyn Transcriber>> {
    let model = &config.stt.model;

    if !is_model_installed(model) {
        if allow_download && config.stt.auto_download && get_model(model).is_some() {
            download_model(model).await?;
        } else {
            anyhow::bail!(
                "Model '{}' not installed at {}. Run: smartspeak models install {}",
                model,
                model_path(model).display(),
                model
            );
        }
    }

    let whisper_config = WhisperConfig {
        model_path: model_path(model),
        beam_size: config.stt.beam_size,
        threads: config.stt.threads,
    };
    let transcriber = tokio::task::spawn_blocking(move || WhisperTranscriber::new(whisper_config))
        .await
        .context("Model loading task failed")??;
    Ok(Arc::new(transcriber))
}

/// Run the HTTP service until shutdown.
pub async fn run_server(config: Config, allow_download: bool) -> anyhow::Result<()> {
    let engines = build_engines(&config, allow_download).await?;
    let state = AppState {
        pipeline: Pipeline::new(engines),
        request_timeout: config.server.request_timeout()?,
    };
    let router = build_router(
        state,
        &RouterOptions {
            cors_origins: config.server.cors_origins.clone(),
            max_upload_bytes: config.server.max_upload_bytes,
        },
    );
    serve(&config.server.bind, router).await
}

/// Analyze one local recording with the configured engines.
pub async fn run_analyze(
    mut config: Config,
    file: &Path,
    upload: bool,
    allow_download: bool,
) -> anyhow::Result<AnalysisResult> {
    if !upload {
        config.storage.cloud_name = None;
    }
    let raw = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let engines = build_engines(&config, allow_download).await?;
    if engines.transcriber.is_none() {
        anyhow::bail!("No transcription model is available");
    }

    let analysis = Pipeline::new(engines).analyze(&raw).await?;
    Ok(analysis.into_result())
}
