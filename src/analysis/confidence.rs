//! Confidence score derived from the transcript's sentiment.

use crate::defaults::DEFAULT_CONFIDENCE;
use crate::error::{Result, SmartSpeakError};
use async_trait::async_trait;
use std::sync::Arc;

/// Polarity reported by a sentiment model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Other(String),
}

impl SentimentLabel {
    /// Parse a model label; anything but exactly POSITIVE/NEGATIVE is kept verbatim.
    pub fn parse(label: &str) -> Self {
        match label {
            "POSITIVE" => Self::Positive,
            "NEGATIVE" => Self::Negative,
            _ => Self::Other(label.to_string()),
        }
    }
}

/// Top label and its probability.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: f64,
}

/// Scores the polarity of a text span.
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    async fn score(&self, text: &str) -> Result<Sentiment>;
}

#[async_trait]
impl<T: SentimentScorer> SentimentScorer for Arc<T> {
    async fn score(&self, text: &str) -> Result<Sentiment> {
        (**self).score(text).await
    }
}

/// Map a sentiment to a 0-100 confidence.
///
/// Positive text scales to the full range; anything else is capped at half scale.
pub fn confidence_from_sentiment(sentiment: &Sentiment) -> u8 {
    let p = if sentiment.score.is_finite() {
        sentiment.score.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let raw = match sentiment.label {
        SentimentLabel::Positive => p * 100.0,
        _ => (1.0 - p) * 50.0,
    };
    raw.round_ties_even().clamp(0.0, 100.0) as u8
}

/// Score the transcript once, falling back to [`DEFAULT_CONFIDENCE`].
pub async fn score_confidence(scorer: Option<&dyn SentimentScorer>, transcript: &str) -> u8 {
    let Some(scorer) = scorer else {
        return DEFAULT_CONFIDENCE;
    };
    match scorer.score(transcript).await {
        Ok(sentiment) => confidence_from_sentiment(&sentiment),
        Err(e) => {
            tracing::warn!(error = %e, "Could not get sentiment analysis");
            DEFAULT_CONFIDENCE
        }
    }
}

/// Mock sentiment scorer for testing
#[derive(Debug, Clone)]
pub struct MockSentimentScorer {
    sentiment: Sentiment,
    should_fail: bool,
}

impl MockSentimentScorer {
    pub fn positive(score: f64) -> Self {
        Self {
            sentiment: Sentiment {
                label: SentimentLabel::Positive,
                score,
            },
            should_fail: false,
        }
    }

    pub fn negative(score: f64) -> Self {
        Self {
            sentiment: Sentiment {
                label: SentimentLabel::Negative,
                score,
            },
            should_fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::positive(0.0)
        }
    }
}

#[async_trait]
impl SentimentScorer for MockSentimentScorer {
    async fn score(&self, _text: &str) -> Result<Sentiment> {
        if self.should_fail {
            return Err(SmartSpeakError::Sentiment {
                message: "mock sentiment failure".to_string(),
            });
        }
        Ok(self.sentiment.clone())
    }
}
