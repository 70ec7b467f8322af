//! CLI subcommands.

pub mod check;
pub mod migrate;

/// Errors from CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] zaheen_storefront::config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Backend error: {0}")]
    Backend(#[from] zaheen_storefront::backend::BackendError),
}
