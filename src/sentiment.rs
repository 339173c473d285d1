//! Remote text-classification sentiment scorer.
//!
//! Talks to a Hugging Face style inference endpoint: the request body is
//! `{"inputs": "<text>"}` and the response is a list of `{label, score}`
//! pairs, sometimes wrapped in an outer list (one entry per input).

use crate::analysis::confidence::{Sentiment, SentimentLabel, SentimentScorer};
use crate::error::{Result, SmartSpeakError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    Batched(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

/// Sentiment scorer backed by an HTTP inference endpoint.
pub struct HuggingFaceSentimentScorer {
    endpoint: String,
    api_token: Option<String>,
    client: reqwest::Client,
}

impl HuggingFaceSentimentScorer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SmartSpeakError::Sentiment {
                message: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            endpoint: endpoint.into(),
            api_token: None,
            client,
        })
    }

    /// Send the token as a bearer credential.
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.api_token = (!token.is_empty()).then_some(token);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Pick the highest-scoring label from a classification response body.
pub fn parse_classification(body: &str) -> Result<Sentiment> {
    let response: ClassificationResponse =
        serde_json::from_str(body).map_err(|e| SmartSpeakError::Sentiment {
            message: format!("Unexpected response shape: {e}"),
        })?;
    let candidates = match response {
        ClassificationResponse::Batched(batches) => batches.into_iter().next().unwrap_or_default(),
        ClassificationResponse::Flat(list) => list,
    };

    candidates
        .into_iter()
        .fold(None::<LabelScore>, |best, candidate| match best {
            Some(b) if b.score >= candidate.score => Some(b),
            _ => Some(candidate),
        })
        .map(|top| Sentiment {
            label: SentimentLabel::parse(&top.label),
            score: top.score,
        })
        .ok_or_else(|| SmartSpeakError::Sentiment {
            message: "Response contained no labels".to_string(),
        })
}

#[async_trait]
impl SentimentScorer for HuggingFaceSentimentScorer {
    async fn score(&self, text: &str) -> Result<Sentiment> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "inputs": text }));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await.map_err(|e| SmartSpeakError::Sentiment {
            message: format!("Request failed: {e}"),
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| SmartSpeakError::Sentiment {
            message: format!("Failed to read response: {e}"),
        })?;
        if !status.is_success() {
            return Err(SmartSpeakError::Sentiment {
                message: format!("Endpoint returned {status}: {body}"),
            });
        }

        let sentiment = parse_classification(&body)?;
        tracing::debug!(label = ?sentiment.label, score = sentiment.score, "Sentiment scored");
        Ok(sentiment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_batched_response() {
        let body = r#"[[{"label":"NEGATIVE","score":0.02},{"label":"POSITIVE","score":0.98}]]"#;
        let sentiment = parse_classification(body).unwrap();
        assert_eq!(sentiment.label, SentimentLabel::Positive);
        assert_eq!(sentiment.score, 0.98);
    }

    #[test]
    fn parses_flat_response() {
        let body = r#"[{"label":"NEGATIVE","score":0.75},{"label":"POSITIVE","score":0.25}]"#;
        let sentiment = parse_classification(body).unwrap();
        assert_eq!(sentiment.label, SentimentLabel::Negative);
        assert_eq!(sentiment.score, 0.75);
    }

    #[test]
    fn ties_keep_the_first_label() {
        let body = r#"[{"label":"POSITIVE","score":0.5},{"label":"NEGATIVE","score":0.5}]"#;
        assert_eq!(parse_classification(body).unwrap().label, SentimentLabel::Positive);
    }

    #[test]
    fn empty_or_malformed_responses_are_errors() {
        assert!(matches!(
            parse_classification("[]"),
            Err(SmartSpeakError::Sentiment { .. })
        ));
        assert!(matches!(
            parse_classification("[[]]"),
            Err(SmartSpeakError::Sentiment { .. })
        ));
        assert!(matches!(
            parse_classification(r#"{"error":"Model is loading"}"#),
            Err(SmartSpeakError::Sentiment { .. })
        ));
    }

    #[test]
    fn empty_token_is_not_sent() {
        let scorer = HuggingFaceSentimentScorer::new("http://localhost:1", Duration::from_secs(1))
            .unwrap()
            .with_api_token("");
        assert!(scorer.api_token.is_none());
        assert_eq!(scorer.endpoint(), "http://localhost:1");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        let scorer =
            HuggingFaceSentimentScorer::new("http://127.0.0.1:9/classify", Duration::from_secs(2))
                .unwrap();
        let result = scorer.score("hello").await;
        assert!(matches!(result, Err(SmartSpeakError::Sentiment { .. })));
    }
}
