//! Backend REST API client.
//!
//! # Architecture
//!
//! - The backend service is the source of truth for products, categories,
//!   users and orders. There is no local sync; every read is a direct API call.
//! - Catalog reads are cached in memory via `moka` (60 second TTL). Admin
//!   writes invalidate the cache.
//! - Authenticated calls send the backend-issued token as a bearer token.
//!
//! # Example
//!
//! ```rust,ignore
//! use zaheen_storefront::backend::BackendClient;
//!
//! let client = BackendClient::new(&config.backend)?;
//! let products = client.list_products().await?;
//! let session = client.login("shopper@example.com", "hunter22").await?;
//! let checkout_url = client.create_checkout(&session.token, &request).await?;
//! ```

mod auth;
mod cache;
mod catalog;
mod checkout;
pub mod types;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::BackendConfig;
use cache::{CacheKey, CacheValue};
use types::ErrorBody;
pub use types::*;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected JSON shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response parsed but lacked a field the operation needs.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Resource not found (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing, expired or insufficient credentials (HTTP 401/403).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status. `message` is the backend's own message
    /// when it sent one.
    #[error("Backend returned {status}: {message}")]
    Api { status: u16, message: String },
}

impl BackendError {
    /// Whether the failure is on the backend's side (or the network) rather
    /// than caused by the request.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) | Self::UnexpectedResponse(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::NotFound(_) | Self::Unauthorized(_) | Self::RateLimited(_) => false,
        }
    }

    /// Message suitable for showing to the user, when the backend gave one.
    #[must_use]
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Api { status, message } if *status < 500 => Some(message.as_str()),
            Self::Unauthorized(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Client for the backend REST API.
///
/// Cheap to clone; all clones share one connection pool and cache.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("zaheen-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.api_url.trim_end_matches('/').to_string(),
                cache: cache::build(),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    fn http(&self) -> &reqwest::Client {
        &self.inner.client
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, request: RequestBuilder) -> Result<String, BackendError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned server error"
            );
        }

        Err(match status {
            StatusCode::NOT_FOUND => BackendError::NotFound(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Unauthorized(message),
            _ => BackendError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    /// Send a request and decode the JSON body of a successful response.
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    /// Drop every cached catalog response.
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
