//! Session table migration.
//!
//! The storefront keeps sessions (logged-in user and cart) in `PostgreSQL`
//! through `tower-sessions-sqlx-store`. This creates its schema and table.
//!
//! # Usage
//!
//! ```bash
//! zaheen-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use tower_sessions_sqlx_store::PostgresStore;
use zaheen_storefront::{config::StorefrontConfig, db};

use super::CommandError;

/// Create the session store table if it does not exist.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the migration fails.
pub async fn sessions() -> Result<(), CommandError> {
    let database_url = StorefrontConfig::database_url_from_env()?;

    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Creating session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Session migration complete");
    Ok(())
}
