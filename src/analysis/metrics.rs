//! Word count, duration and speaking rate.

/// Derived per-request speech metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechMetrics {
    pub word_count: usize,
    pub duration_seconds: f64,
    /// Rounded words per minute.
    pub wpm: u32,
    pub pitch_modulation: f64,
}

impl SpeechMetrics {
    /// Compute metrics from a transcript, clip duration and pitch modulation.
    pub fn compute(transcript: &str, duration_seconds: f64, pitch_modulation: f64) -> Self {
        let word_count = word_count(transcript);
        Self {
            word_count,
            duration_seconds,
            wpm: round_wpm(words_per_minute(word_count, duration_seconds)),
            pitch_modulation,
        }
    }
}

/// Number of whitespace-delimited tokens.
pub fn word_count(transcript: &str) -> usize {
    transcript.split_whitespace().count()
}

/// Unrounded speaking rate; `0.0` for non-positive (or NaN) durations.
pub fn words_per_minute(word_count: usize, duration_seconds: f64) -> f64 {
    if duration_seconds.is_nan() || duration_seconds <= 0.0 {
        return 0.0;
    }
    word_count as f64 / duration_seconds * 60.0
}

/// Round a rate to an integer, ties to even (169.5 -> 170, 170.5 -> 170).
pub fn round_wpm(wpm: f64) -> u32 {
    if !wpm.is_finite() || wpm <= 0.0 {
        return 0;
    }
    wpm.round_ties_even().min(u32::MAX as f64) as u32
}

/// Round to two decimals for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
