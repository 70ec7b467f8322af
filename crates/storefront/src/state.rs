//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::backend::{BackendClient, BackendError};
use crate::config::StorefrontConfig;
use crate::services::MediaUploader;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    backend: BackendClient,
    media: MediaUploader,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;
        let media = MediaUploader::new(config.cloudinary.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                backend,
                media,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the media uploader.
    #[must_use]
    pub fn media(&self) -> &MediaUploader {
        &self.inner.media
    }
}
