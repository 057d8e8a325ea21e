use async_trait::async_trait;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::time::Duration;

use crate::config::CloudinaryConfig;
use crate::models::Avatar;
use crate::utils::multipart::UploadedFile;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object storage is not configured")]
    NotConfigured,
    #[error("upload request failed: {0}")]
    Transport(String),
    #[error("upload rejected ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoredImage {
    pub secure_url: String,
    pub public_id: String,
}

impl From<StoredImage> for Avatar {
    fn from(image: StoredImage) -> Self {
        Avatar {
            url: image.secure_url,
            public_id: image.public_id,
        }
    }
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn upload(&self, file: &UploadedFile, folder: &str) -> Result<StoredImage, StorageError>;
}

/// Used when no Cloudinary credentials are configured; every upload fails
pub struct DisabledImageStore;

#[async_trait]
impl ImageStore for DisabledImageStore {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn upload(&self, _file: &UploadedFile, _folder: &str) -> Result<StoredImage, StorageError> {
        Err(StorageError::NotConfigured)
    }
}

pub struct CloudinaryClient {
    config: CloudinaryConfig,
    http: reqwest::Client,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig, timeout_secs: u64) -> Result<Self, StorageError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        Ok(Self { config, http })
    }

    fn upload_url(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.config.cloud_name
        )
    }
}

/// Cloudinary request signature: sorted `key=value` pairs joined by `&`,
/// secret appended, SHA-1, lowercase hex.
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl ImageStore for CloudinaryClient {
    async fn upload(&self, file: &UploadedFile, folder: &str) -> Result<StoredImage, StorageError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("folder", folder.to_string()), ("timestamp", timestamp.clone())],
            &self.config.api_secret,
        );

        let mut part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.filename.clone().unwrap_or_else(|| "upload".to_string()));
        if let Some(content_type) = &file.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| StorageError::Transport(e.to_string()))?;
        }

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("signature", signature);

        let response = self
            .http
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<StoredImage>()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))
    }
}

/// Uploads each file in turn, skipping the ones that fail.
/// Sequential on purpose: latency is files × one round trip.
pub async fn upload_each(store: &dyn ImageStore, files: &[&UploadedFile], folder: &str) -> Vec<StoredImage> {
    let mut stored = Vec::with_capacity(files.len());

    for file in files {
        match store.upload(file, folder).await {
            Ok(image) => stored.push(image),
            Err(e) => log::error!(
                "❌ Image upload error ({}): {}",
                file.filename.as_deref().unwrap_or("unnamed"),
                e
            ),
        }
    }

    stored
}
