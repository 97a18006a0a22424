//! Sepolia Swap Demo Backend
//!
//! HTTP server for the quote endpoint.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sepolia_swap_demo::{api, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::info!(
        live_quotes = config.live_quotes_enabled(),
        "Starting Sepolia Swap Demo Backend"
    );

    api::serve(&config).await?;

    Ok(())
}
