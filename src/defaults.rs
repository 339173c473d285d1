//! Default configuration constants for smartspeak.
//!
//! Shared by the config layer, the collaborators and the analysis core so the
//! same numbers are never spelled twice.

/// Canonical sample rate of the normalized waveform, in Hz.
pub const SAMPLE_RATE: u32 = 16000;

/// Default Whisper model name.
///
/// "small" fits comfortably in memory on CPU-only hosts while staying accurate
/// enough for conversational English.
pub const DEFAULT_MODEL: &str = "small";

/// Transcription language. Analysis is English-only.
pub const LANGUAGE: &str = "en";

/// Beam width used for Whisper decoding.
pub const BEAM_SIZE: u32 = 5;

/// Address the HTTP server binds to.
pub const BIND_ADDRESS: &str = "0.0.0.0:5000";

/// Upper bound for a single analysis request, in humantime notation.
pub const REQUEST_TIMEOUT: &str = "120s";

/// Largest accepted upload (25 MiB).
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Confidence reported when no sentiment score is available.
pub const DEFAULT_CONFIDENCE: u8 = 50;

/// Text-classification endpoint used for the confidence score.
pub const SENTIMENT_ENDPOINT: &str = "https://api-inference.huggingface.co/models/distilbert-base-uncased-finetuned-sst-2-english";

/// Timeout for a single sentiment request, in humantime notation.
pub const SENTIMENT_TIMEOUT: &str = "15s";

/// Folder prefix for uploaded clips in the blob store.
pub const UPLOAD_FOLDER: &str = "smart-speak";

/// Report the GPU backend compiled into this build.
pub fn gpu_backend() -> &'static str {
    if cfg!(feature = "cuda") {
        "CUDA"
    } else if cfg!(feature = "vulkan") {
        "Vulkan"
    } else if cfg!(feature = "hipblas") {
        "HipBLAS (AMD)"
    } else if cfg!(feature = "openblas") {
        "OpenBLAS"
    } else {
        "CPU"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_backend_matches_compiled_feature() {
        let expected = if cfg!(feature = "cuda") {
            "CUDA"
        } else if cfg!(feature = "vulkan") {
            "Vulkan"
        } else if cfg!(feature = "hipblas") {
            "HipBLAS (AMD)"
        } else if cfg!(feature = "openblas") {
            "OpenBLAS"
        } else {
            "CPU"
        };
        assert_eq!(gpu_backend(), expected);
    }

    #[test]
    fn default_durations_parse() {
        assert!(humantime::parse_duration(REQUEST_TIMEOUT).is_ok());
        assert!(humantime::parse_duration(SENTIMENT_TIMEOUT).is_ok());
    }
}
