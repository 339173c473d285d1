//! smartspeak - speech practice analysis
//!
//! Transcribes a recorded clip, measures pace and pitch variety, scores
//! confidence from the transcript's sentiment, and turns the numbers into
//! coaching feedback.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod analysis;
pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod sentiment;
pub mod server;
pub mod storage;
pub mod stt;

// Capability traits
pub use analysis::{PitchTracker, SentimentScorer};
pub use audio::AudioNormalizer;
pub use storage::BlobStore;
pub use stt::Transcriber;

// Pipeline
pub use analysis::{Analysis, AnalysisResult};
pub use pipeline::{EngineContext, Pipeline};

// Error handling
pub use error::{Result, SmartSpeakError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
