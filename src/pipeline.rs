//! Speech analysis pipeline.
//!
//! Orchestrates one request end to end:
//! normalize → persist → upload → transcribe → pitch → confidence → feedback

use crate::analysis::confidence::{SentimentScorer, score_confidence};
use crate::analysis::feedback::{FeedbackInput, synthesize};
use crate::analysis::metrics::SpeechMetrics;
use crate::analysis::pitch::{PitchTracker, modulation_or_default};
use crate::analysis::report::{Analysis, assemble, short_circuit};
use crate::audio::{AudioNormalizer, NormalizedAudio};
use crate::defaults::UPLOAD_FOLDER;
use crate::error::{Result, SmartSpeakError};
use crate::storage::{BlobStore, new_public_id};
use crate::stt::{Transcriber, join_segments};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Engines shared by every request.
///
/// Built once at startup and cloned cheaply into each pipeline run.
#[derive(Clone)]
pub struct EngineContext {
    pub normalizer: Arc<dyn AudioNormalizer>,
    pub transcriber: Option<Arc<dyn Transcriber>>,
    pub pitch_tracker: Arc<dyn PitchTracker>,
    pub sentiment: Option<Arc<dyn SentimentScorer>>,
    pub blob_store: Option<Arc<dyn BlobStore>>,
    pub upload_folder: String,
    /// Directory for per-request temporary files; the system default when `None`.
    pub temp_dir: Option<PathBuf>,
}

impl EngineContext {
    pub fn new(normalizer: Arc<dyn AudioNormalizer>, pitch_tracker: Arc<dyn PitchTracker>) -> Self {
        Self {
            normalizer,
            transcriber: None,
            pitch_tracker,
            sentiment: None,
            blob_store: None,
            upload_folder: UPLOAD_FOLDER.to_string(),
            temp_dir: None,
        }
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn with_sentiment(mut self, scorer: Arc<dyn SentimentScorer>) -> Self {
        self.sentiment = Some(scorer);
        self
    }

    pub fn with_blob_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blob_store = Some(store);
        self
    }

    pub fn with_upload_folder(mut self, folder: impl Into<String>) -> Self {
        self.upload_folder = folder.into();
        self
    }

    pub fn with_temp_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.temp_dir = dir;
        self
    }

    /// True when a transcriber is loaded and ready.
    pub fn transcriber_ready(&self) -> bool {
        self.transcriber.as_ref().is_some_and(|t| t.is_ready())
    }
}

/// Runs the analysis for one uploaded clip.
#[derive(Clone)]
pub struct Pipeline {
    engines: EngineContext,
}

impl Pipeline {
    pub fn new(engines: EngineContext) -> Self {
        Self { engines }
    }

    pub fn engines(&self) -> &EngineContext {
        &self.engines
    }

    /// Analyze raw uploaded file bytes.
    ///
    /// Pitch, sentiment and upload failures degrade to defaults. Decode,
    /// transcription and temp-file failures abort the run. The temporary
    /// waveform is removed on every exit path.
    pub async fn analyze(&self, raw: &[u8]) -> Result<Analysis> {
        let transcriber = self
            .engines
            .transcriber
            .clone()
            .filter(|t| t.is_ready())
            .ok_or(SmartSpeakError::TranscriberUnavailable)?;

        let audio = self.engines.normalizer.normalize(raw)?;
        let duration = audio.duration_secs();
        tracing::info!(
            bytes = raw.len(),
            duration_secs = duration,
            "Audio normalized"
        );

        let waveform = self.persist(&audio)?;
        let audio_url = self.upload(waveform.path()).await;

        let samples = audio.samples;
        let segments = tokio::task::spawn_blocking(move || transcriber.transcribe(&samples))
            .await
            .map_err(|e| SmartSpeakError::Transcription {
                message: format!("Transcription task failed: {e}"),
            })??;
        let transcript = join_segments(&segments);

        let metrics = SpeechMetrics::compute(&transcript, duration, 0.0);
        if metrics.word_count == 0 {
            tracing::info!("No speech detected, returning fixed report");
            return Ok(Analysis::ShortCircuited(short_circuit(
                transcript, duration, audio_url,
            )));
        }
        tracing::info!(words = metrics.word_count, wpm = metrics.wpm, "Transcribed");

        let pitch_modulation = self.pitch_modulation(waveform.path().to_path_buf()).await;
        let metrics = SpeechMetrics {
            pitch_modulation,
            ..metrics
        };

        let confidence = score_confidence(self.engines.sentiment.as_deref(), &transcript).await;

        let report = synthesize(&FeedbackInput {
            transcript: &transcript,
            wpm: metrics.wpm,
            pitch_modulation: metrics.pitch_modulation,
            word_count: metrics.word_count,
            duration_seconds: metrics.duration_seconds,
        });
        tracing::info!(
            pitch_modulation,
            confidence,
            mistakes = report.mistakes.len(),
            "Analysis complete"
        );

        Ok(Analysis::Analyzed(assemble(
            transcript, &metrics, confidence, report, audio_url,
        )))
    }

    fn persist(&self, audio: &NormalizedAudio) -> Result<tempfile::NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("smartspeak-").suffix(".wav");
        let file = match &self.engines.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        audio.write_wav(file.path())?;
        Ok(file)
    }

    async fn upload(&self, waveform: &Path) -> Option<String> {
        let store = self.engines.blob_store.as_ref()?;
        let public_id = new_public_id(&self.engines.upload_folder);
        match store.upload(waveform, &public_id).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(error = %e, "Could not upload clip");
                None
            }
        }
    }

    async fn pitch_modulation(&self, waveform: PathBuf) -> f64 {
        let tracker = Arc::clone(&self.engines.pitch_tracker);
        tokio::task::spawn_blocking(move || modulation_or_default(tracker.as_ref(), &waveform))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Pitch task failed");
                0.0
            })
    }
}
