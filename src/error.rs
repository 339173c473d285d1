//! Error types for smartspeak.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmartSpeakError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio errors
    #[error("Audio decode failed: {message}")]
    AudioDecode { message: String },

    #[error("Audio encode failed: {message}")]
    AudioEncode { message: String },

    // Transcription errors
    #[error("Transcription model not found at {path}")]
    TranscriptionModelNotFound { path: String },

    #[error("Transcription inference failed: {message}")]
    TranscriptionInferenceFailed { message: String },

    #[error("Transcription error: {message}")]
    Transcription { message: String },

    #[error("No transcription engine is loaded")]
    TranscriberUnavailable,

    // Degradable collaborator errors
    #[error("Pitch tracking failed: {message}")]
    PitchTracking { message: String },

    #[error("Sentiment scoring failed: {message}")]
    Sentiment { message: String },

    #[error("Upload failed: {message}")]
    Upload { message: String },

    // Model management
    #[error("Model download failed: {message}")]
    ModelDownload { message: String },

    #[error("Analysis timed out after {seconds}s")]
    Timeout { seconds: u64 },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SmartSpeakError>;
