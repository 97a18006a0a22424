//! Configuration management module.
//!
//! Handles loading configuration from environment variables.

use std::{env, net::SocketAddr, time::Duration};

use crate::error::AppError;

/// Default 0x API base URL for Sepolia.
pub const DEFAULT_ZEROEX_API_URL: &str = "https://sepolia.api.0x.org";

/// Default PostHog ingestion host.
pub const DEFAULT_POSTHOG_HOST: &str = "https://us.i.posthog.com";

/// Default bound on the aggregator call.
pub const DEFAULT_AGGREGATOR_TIMEOUT: Duration = Duration::from_secs(10);

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,
    /// 0x API key. `None` keeps the quote builder in mock mode.
    pub zeroex_api_key: Option<String>,
    /// 0x API base URL.
    pub zeroex_api_url: String,
    /// Timeout applied to the aggregator request.
    pub aggregator_timeout: Duration,
    /// Ethereum JSON-RPC endpoint URL, used by the wallet gateway.
    pub rpc_url: Option<String>,
    /// Private key for the wallet gateway (hex string with 0x prefix).
    pub private_key: Option<String>,
    /// PostHog project API key. `None` disables remote analytics.
    pub posthog_api_key: Option<String>,
    /// PostHog ingestion host.
    pub posthog_host: String,
    /// Logging level (default: info).
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            zeroex_api_key: None,
            zeroex_api_url: DEFAULT_ZEROEX_API_URL.to_string(),
            aggregator_timeout: DEFAULT_AGGREGATOR_TIMEOUT,
            rpc_url: None,
            private_key: None,
            posthog_api_key: None,
            posthog_host: DEFAULT_POSTHOG_HOST.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `BIND_ADDR`: listen address (default: 127.0.0.1:3000)
    /// - `ZEROEX_API_KEY`: enables live quotes from the 0x API
    /// - `ZEROEX_API_URL`: 0x API base URL (default: Sepolia endpoint)
    /// - `AGGREGATOR_TIMEOUT_SECS`: aggregator timeout in seconds (default: 10)
    /// - `ETHEREUM_RPC_URL` / `ETHEREUM_PRIVATE_KEY`: wallet gateway settings
    /// - `POSTHOG_API_KEY` / `POSTHOG_HOST`: analytics sink
    /// - `LOG_LEVEL`: Logging level (default: info)
    ///
    /// Note: Only the Sepolia testnet (chain ID 11155111) is supported.
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let bind_addr = match non_empty_var("BIND_ADDR") {
            Some(raw) => raw
                .parse::<SocketAddr>()
                .map_err(|e| AppError::Config(format!("Invalid BIND_ADDR '{}': {}", raw, e)))?,
            None => defaults.bind_addr,
        };

        let aggregator_timeout = match non_empty_var("AGGREGATOR_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| {
                    AppError::Config(format!("Invalid AGGREGATOR_TIMEOUT_SECS '{}': {}", raw, e))
                })?;
                if secs == 0 {
                    return Err(AppError::Config(
                        "AGGREGATOR_TIMEOUT_SECS must be greater than zero".into(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.aggregator_timeout,
        };

        Ok(Self {
            bind_addr,
            zeroex_api_key: non_empty_var("ZEROEX_API_KEY"),
            zeroex_api_url: non_empty_var("ZEROEX_API_URL").unwrap_or(defaults.zeroex_api_url),
            aggregator_timeout,
            rpc_url: non_empty_var("ETHEREUM_RPC_URL"),
            private_key: non_empty_var("ETHEREUM_PRIVATE_KEY"),
            posthog_api_key: non_empty_var("POSTHOG_API_KEY"),
            posthog_host: non_empty_var("POSTHOG_HOST").unwrap_or(defaults.posthog_host),
            log_level: non_empty_var("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    /// Whether live aggregator quotes are configured.
    pub fn live_quotes_enabled(&self) -> bool {
        self.zeroex_api_key.is_some()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
