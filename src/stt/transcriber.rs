use crate::error::{Result, SmartSpeakError};
use std::sync::Arc;

/// One decoded span of speech, in the order the engine emitted it.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Concatenate segments in order and trim the result.
///
/// Segments are joined without a separator; engines already carry the
/// leading space of each segment in its text.
pub fn join_segments(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Trait for speech-to-text transcription.
///
/// This trait allows swapping implementations (real Whisper vs mock).
pub trait Transcriber: Send + Sync {
    /// Transcribe audio samples into ordered segments.
    ///
    /// # Arguments
    /// * `audio` - Audio samples as 16-bit PCM at 16kHz mono
    fn transcribe(&self, audio: &[i16]) -> Result<Vec<TranscriptSegment>>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;

    /// Check if the transcriber is ready
    fn is_ready(&self) -> bool;
}

/// Implement Transcriber for Arc<T> to allow sharing across requests.
impl<T: Transcriber> Transcriber for Arc<T> {
    fn transcribe(&self, audio: &[i16]) -> Result<Vec<TranscriptSegment>> {
        (**self).transcribe(audio)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Mock transcriber for testing
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    model_name: String,
    segments: Vec<TranscriptSegment>,
    should_fail: bool,
    ready: bool,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            segments: vec![TranscriptSegment::new(" mock transcription")],
            should_fail: false,
            ready: true,
        }
    }

    /// Configure the mock to return a single segment
    pub fn with_response(self, response: &str) -> Self {
        self.with_segments(&[response])
    }

    /// Configure the mock to return several segments in order
    pub fn with_segments(mut self, segments: &[&str]) -> Self {
        self.segments = segments.iter().map(|s| TranscriptSegment::new(*s)).collect();
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Configure the mock to report itself as not loaded
    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, _audio: &[i16]) -> Result<Vec<TranscriptSegment>> {
        if self.should_fail {
            Err(SmartSpeakError::Transcription {
                message: "mock transcription failure".to_string(),
            })
        } else {
            Ok(self.segments.clone())
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_segments_preserves_order_and_trims() {
        let segments = vec![
            TranscriptSegment::new(" Hello"),
            TranscriptSegment::new(" there,"),
            TranscriptSegment::new(" friend. "),
        ];
        assert_eq!(join_segments(&segments), "Hello there, friend.");
    }

    #[test]
    fn join_segments_does_not_insert_separators() {
        let segments = vec![TranscriptSegment::new("ab"), TranscriptSegment::new("cd")];
        assert_eq!(join_segments(&segments), "abcd");
    }

    #[test]
    fn join_segments_empty_is_empty() {
        assert_eq!(join_segments(&[]), "");
        assert_eq!(join_segments(&[TranscriptSegment::new("   ")]), "");
    }

    #[test]
    fn test_mock_transcriber_returns_segments() {
        let transcriber = MockTranscriber::new("test-model").with_segments(&[" one", " two"]);

        let result = transcriber.transcribe(&[0i16; 1000]).unwrap();
        assert_eq!(
            result,
            vec![TranscriptSegment::new(" one"), TranscriptSegment::new(" two")]
        );
    }

    #[test]
    fn test_mock_transcriber_returns_error_when_configured() {
        let transcriber = MockTranscriber::new("test-model").with_failure();

        match transcriber.transcribe(&[0i16; 1000]) {
            Err(SmartSpeakError::Transcription { message }) => {
                assert_eq!(message, "mock transcription failure");
            }
            other => panic!("Expected Transcription error, got {:?}", other),
        }
    }

    #[test]
    fn test_mock_transcriber_is_ready() {
        assert!(MockTranscriber::new("test-model").is_ready());
        assert!(MockTranscriber::new("test-model").with_failure().is_ready());
        assert!(!MockTranscriber::new("test-model").not_ready().is_ready());
    }

    #[test]
    fn test_transcriber_trait_is_object_safe() {
        let transcriber: Arc<dyn Transcriber> =
            Arc::new(MockTranscriber::new("test-model").with_response("boxed test"));

        assert_eq!(transcriber.model_name(), "test-model");
        let segments = transcriber.transcribe(&[0i16; 100]).unwrap();
        assert_eq!(join_segments(&segments), "boxed test");
    }
}
