//! `PostgreSQL` connection handling.
//!
//! The storefront keeps no domain data of its own (the backend API is the
//! source of truth for products, categories and users). The database only
//! backs the session store, which holds the logged-in user and the cart.
//!
//! The `tower_sessions` schema is created by:
//! ```bash
//! cargo run -p zaheen-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Check that the database answers queries. Used by the readiness probe.
///
/// # Errors
///
/// Returns `sqlx::Error` if the ping query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
