//! Cloudinary uploads for product images.
//!
//! Uploads are unsigned and use an upload preset, so no API secret is held by
//! the storefront. PDFs go to the `raw` endpoint; everything else is uploaded
//! as an image.

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::CloudinaryConfig;

/// Cloudinary upload API base URL.
const BASE_URL: &str = "https://api.cloudinary.com/v1_1";

/// Errors that can occur when uploading media.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Cloud name or upload preset is not set.
    #[error("Cloudinary configuration missing. Set CLOUDINARY_CLOUD_NAME and CLOUDINARY_UPLOAD_PRESET.")]
    NotConfigured,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Cloudinary rejected the upload.
    #[error("Cloudinary upload failed: {0}")]
    Rejected(String),
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    secure_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadErrorResponse {
    error: UploadErrorDetail,
}

#[derive(Debug, Deserialize)]
struct UploadErrorDetail {
    message: String,
}

/// A file received from a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Cloudinary resource type for this file.
    #[must_use]
    pub fn resource_type(&self) -> &'static str {
        if self.content_type == "application/pdf" {
            "raw"
        } else {
            "image"
        }
    }
}

/// Client for unsigned Cloudinary uploads.
#[derive(Clone)]
pub struct MediaUploader {
    client: reqwest::Client,
    config: Option<CloudinaryConfig>,
}

impl MediaUploader {
    /// Create an uploader. With no configuration every upload fails with
    /// [`MediaError::NotConfigured`].
    #[must_use]
    pub fn new(config: Option<CloudinaryConfig>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Upload a file and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::NotConfigured`] if Cloudinary is not configured,
    /// or an error if the upload is rejected.
    #[instrument(skip(self, upload), fields(file_name = %upload.file_name, size = upload.bytes.len()))]
    pub async fn upload(&self, upload: Upload) -> Result<String, MediaError> {
        let config = self.config.as_ref().ok_or(MediaError::NotConfigured)?;
        let endpoint = upload_url(config, upload.resource_type());

        let part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", config.upload_preset.clone());

        let response = self.client.post(&endpoint).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<UploadErrorResponse>(&body)
                .map_or_else(|_| format!("HTTP {status}"), |e| e.error.message);
            return Err(MediaError::Rejected(message));
        }

        let parsed: UploadResponse =
            serde_json::from_str(&body).map_err(|e| MediaError::Rejected(e.to_string()))?;
        let url = parsed
            .secure_url
            .or(parsed.url)
            .ok_or_else(|| MediaError::Rejected("response has no url".to_string()))?;

        info!(url = %url, "Uploaded media");
        Ok(url)
    }
}

fn upload_url(config: &CloudinaryConfig, resource_type: &str) -> String {
    format!("{BASE_URL}/{}/{resource_type}/upload", config.cloud_name)
}
