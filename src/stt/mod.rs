//! Speech-to-text engines.

pub mod transcriber;
pub mod whisper;

pub use transcriber::{MockTranscriber, TranscriptSegment, Transcriber, join_segments};
