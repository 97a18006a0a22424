//! Sepolia Swap Demo Backend
//!
//! Quote service and swap flow for a token-swap demo on the Sepolia testnet.
//!
//! # Features
//!
//! - **Quote Endpoint**: `POST /api/quote` builds a price quote from a 0x-style
//!   aggregator, falling back to a deterministic mock price table
//! - **Swap Flow**: allowance, approval and swap state machine driven through
//!   a [`WalletGateway`](ethereum::WalletGateway)
//! - **Analytics**: best-effort event capture to logs or PostHog
//!
//! # Example
//!
//! ```rust,ignore
//! use sepolia_swap_demo::{api, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     api::serve(&config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod ethereum;
pub mod services;
pub mod types;

pub use config::Config;
pub use error::{ApiError, AppError, ErrorKind, Result};
pub use ethereum::constants::*;
pub use services::{QuoteBuilder, SwapFlow, TokenRegistry};
