//! The externally visible analysis record.

use crate::analysis::feedback::FeedbackReport;
use crate::analysis::metrics::{SpeechMetrics, round2};
use serde::{Deserialize, Serialize};

pub const NO_SPEECH_TRANSCRIPT: &str = "No speech detected.";
pub const TOO_SHORT_FEEDBACK: &str = "Recording was too short or silent.";
pub const TOO_SHORT_IMPROVEMENT: &str = "Try speaking clearly for at least 3 seconds.";
pub const TOO_SHORT_MISTAKE: &str = "No significant speech was detected.";

/// Final per-request result, serialized with the field names clients expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub transcript: String,
    pub wpm: u32,
    pub pitch_modulation: f64,
    pub duration: f64,
    #[serde(rename = "audioURL")]
    pub audio_url: Option<String>,
    pub confidence_score: u8,
    pub feedback: String,
    pub improvements: Vec<String>,
    pub mistakes: Vec<String>,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    /// No usable speech; a fixed report was produced without running the rules.
    ShortCircuited(AnalysisResult),
    /// Full metrics and feedback.
    Analyzed(AnalysisResult),
}

impl Analysis {
    pub fn result(&self) -> &AnalysisResult {
        match self {
            Analysis::ShortCircuited(result) | Analysis::Analyzed(result) => result,
        }
    }

    pub fn into_result(self) -> AnalysisResult {
        match self {
            Analysis::ShortCircuited(result) | Analysis::Analyzed(result) => result,
        }
    }

    pub fn is_short_circuited(&self) -> bool {
        matches!(self, Analysis::ShortCircuited(_))
    }
}

/// Merge metrics, confidence and feedback into the presented record.
pub fn assemble(
    transcript: String,
    metrics: &SpeechMetrics,
    confidence_score: u8,
    report: FeedbackReport,
    audio_url: Option<String>,
) -> AnalysisResult {
    AnalysisResult {
        transcript,
        wpm: metrics.wpm,
        pitch_modulation: round2(metrics.pitch_modulation),
        duration: round2(metrics.duration_seconds),
        audio_url,
        confidence_score,
        feedback: report.feedback,
        improvements: report.improvements,
        mistakes: report.mistakes,
    }
}

/// Fixed report for empty or silent recordings.
pub fn short_circuit(
    transcript: String,
    duration_seconds: f64,
    audio_url: Option<String>,
) -> AnalysisResult {
    let transcript = if transcript.is_empty() {
        NO_SPEECH_TRANSCRIPT.to_string()
    } else {
        transcript
    };
    AnalysisResult {
        transcript,
        wpm: 0,
        pitch_modulation: 0.0,
        duration: round2(duration_seconds),
        audio_url,
        confidence_score: 0,
        feedback: TOO_SHORT_FEEDBACK.to_string(),
        improvements: vec![TOO_SHORT_IMPROVEMENT.to_string()],
        mistakes: vec![TOO_SHORT_MISTAKE.to_string()],
    }
}
