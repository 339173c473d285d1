//! Cloudinary signed uploads.
//!
//! Clips are uploaded with resource type `video` (Cloudinary files audio
//! under video) using a signed request: the signature is the SHA-1 hex digest
//! of the sorted, `&`-joined signed parameters followed by the API secret.

use crate::error::{Result, SmartSpeakError};
use crate::storage::BlobStore;
use async_trait::async_trait;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Account credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl CloudinaryConfig {
    /// All three credentials are present.
    pub fn is_complete(&self) -> bool {
        !self.cloud_name.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

pub struct CloudinaryStore {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn upload_url(&self) -> String {
        format!("{API_BASE}/{}/video/upload", self.config.cloud_name)
    }
}

/// Sign `public_id` and `timestamp` with the account secret.
pub fn sign(public_id: &str, timestamp: u64, api_secret: &str) -> String {
    let to_sign = format!("public_id={public_id}&timestamp={timestamp}{api_secret}");
    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl BlobStore for CloudinaryStore {
    async fn upload(&self, file: &Path, public_id: &str) -> Result<String> {
        let bytes = tokio::fs::read(file).await.map_err(|e| SmartSpeakError::Upload {
            message: format!("Failed to read {}: {e}", file.display()),
        })?;
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let file_part = reqwest::multipart::Part::bytes(bytes)
            .file_name("clip.wav")
            .mime_str("audio/wav")
            .map_err(|e| SmartSpeakError::Upload {
                message: format!("MIME error: {e}"),
            })?;
        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("public_id", public_id.to_string())
            .text("signature", sign(public_id, timestamp, &self.config.api_secret));

        let resp = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| SmartSpeakError::Upload {
                message: format!("Request failed: {e}"),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SmartSpeakError::Upload {
                message: format!("Cloudinary returned {status}: {body}"),
            });
        }

        let body: UploadResponse = resp.json().await.map_err(|e| SmartSpeakError::Upload {
            message: format!("Response parse error: {e}"),
        })?;
        tracing::info!(public_id, url = %body.secure_url, "Clip uploaded");
        Ok(body.secure_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CloudinaryConfig {
        CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "1234".to_string(),
            api_secret: "abcd".to_string(),
        }
    }

    #[test]
    fn signature_is_sha1_of_params_and_secret() {
        // sha1("public_id=sample_image&timestamp=1315060510abcd")
        assert_eq!(
            sign("sample_image", 1315060510, "abcd"),
            "b4ad47fb4e25c7bf5f92a20089f9db59bc302313"
        );
    }

    #[test]
    fn signature_changes_with_each_input() {
        let base = sign("a", 1, "s");
        assert_ne!(base, sign("b", 1, "s"));
        assert_ne!(base, sign("a", 2, "s"));
        assert_ne!(base, sign("a", 1, "t"));
        assert_eq!(base.len(), 40);
    }

    #[test]
    fn upload_url_targets_video_resource() {
        let store = CloudinaryStore::new(config());
        assert_eq!(
            store.upload_url(),
            "https://api.cloudinary.com/v1_1/demo/video/upload"
        );
    }

    #[test]
    fn incomplete_credentials_are_detected() {
        assert!(config().is_complete());
        let mut partial = config();
        partial.api_secret.clear();
        assert!(!partial.is_complete());
    }

    #[tokio::test]
    async fn missing_file_is_an_upload_error() {
        let store = CloudinaryStore::new(config());
        let result = store
            .upload(Path::new("/nonexistent/clip.wav"), "smart-speak/x")
            .await;
        assert!(matches!(result, Err(SmartSpeakError::Upload { .. })));
    }
}
