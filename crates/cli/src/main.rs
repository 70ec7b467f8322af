//! Zaheen Knitwears CLI - session migrations and deployment checks.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table
//! zaheen-cli migrate
//!
//! # Verify configuration, database and backend
//! zaheen-cli check
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "zaheen-cli")]
#[command(author, version, about = "Zaheen Knitwears CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the session store table
    Migrate,
    /// Verify configuration, database and backend reachability
    Check,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Migrate => commands::migrate::sessions().await,
        Commands::Check => commands::check::run().await,
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}
