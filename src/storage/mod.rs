//! Blob storage for uploaded clips.

pub mod cloudinary;

pub use cloudinary::{CloudinaryConfig, CloudinaryStore};

use crate::error::{Result, SmartSpeakError};
use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Durable storage that returns a public URL for an uploaded file.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, file: &Path, public_id: &str) -> Result<String>;
}

#[async_trait]
impl<T: BlobStore> BlobStore for Arc<T> {
    async fn upload(&self, file: &Path, public_id: &str) -> Result<String> {
        (**self).upload(file, public_id).await
    }
}

/// Public id for a new clip under `folder`.
pub fn new_public_id(folder: &str) -> String {
    let id = uuid::Uuid::new_v4();
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        id.to_string()
    } else {
        format!("{folder}/{id}")
    }
}

/// Mock blob store for testing
#[derive(Debug, Default)]
pub struct MockBlobStore {
    base_url: String,
    should_fail: bool,
    uploads: Mutex<Vec<String>>,
}

impl MockBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    /// Public ids uploaded so far.
    pub fn uploads(&self) -> Vec<String> {
        self.uploads
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    async fn upload(&self, file: &Path, public_id: &str) -> Result<String> {
        if self.should_fail {
            return Err(SmartSpeakError::Upload {
                message: "mock upload failure".to_string(),
            });
        }
        if !file.exists() {
            return Err(SmartSpeakError::Upload {
                message: format!("{} does not exist", file.display()),
            });
        }
        if let Ok(mut uploads) = self.uploads.lock() {
            uploads.push(public_id.to_string());
        }
        Ok(format!("{}/{}.wav", self.base_url.trim_end_matches('/'), public_id))
    }
}
