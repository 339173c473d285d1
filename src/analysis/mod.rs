//! Metrics and feedback derivation.
//!
//! Everything here is deterministic given its inputs; the only external calls
//! are the pitch tracker and sentiment scorer traits, both of which degrade to
//! defaults on failure.

pub mod confidence;
pub mod feedback;
pub mod metrics;
pub mod pitch;
pub mod report;
pub mod stft;

pub use confidence::{Sentiment, SentimentLabel, SentimentScorer, score_confidence};
pub use feedback::{FeedbackInput, FeedbackReport, synthesize};
pub use metrics::SpeechMetrics;
pub use pitch::{PitchCandidate, PitchFrames, PitchTracker};
pub use report::{Analysis, AnalysisResult};
pub use stft::StftPitchTracker;
