//! Environment check.
//!
//! Loads the full storefront configuration, pings the database and lists
//! the backend catalog so a deployment can be verified before it serves
//! traffic.

use zaheen_storefront::{backend::BackendClient, config::StorefrontConfig, db};

use super::CommandError;

/// Verify configuration, database and backend reachability.
///
/// # Errors
///
/// Returns the first failing check.
pub async fn run() -> Result<(), CommandError> {
    let config = StorefrontConfig::from_env()?;
    tracing::info!(base_url = %config.base_url, "Configuration loaded");

    let pool = db::create_pool(&config.database_url).await?;
    db::ping(&pool).await?;
    tracing::info!("Database reachable");

    let backend = BackendClient::new(&config.backend)?;
    let products = backend.list_products().await?;
    let categories = backend.list_categories().await?;
    tracing::info!(
        api_url = %config.backend.api_url,
        products = products.len(),
        categories = categories.len(),
        "Backend reachable"
    );

    if config.cloudinary.is_none() {
        tracing::warn!("Cloudinary is not configured; product image uploads will fail");
    }
    if config.google_client_id.is_none() {
        tracing::info!("GOOGLE_CLIENT_ID not set; Google sign-in is disabled");
    }

    Ok(())
}
