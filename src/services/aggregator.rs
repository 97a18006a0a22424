//! Swap aggregator client.
//!
//! Issues the single outbound quote request to a 0x-style API.

use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    types::LiquiditySource,
};

/// Quote path on the aggregator API.
pub const QUOTE_PATH: &str = "/swap/v1/quote";

/// Parameters of an aggregator quote request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorRequest {
    pub sell_token: Address,
    pub buy_token: Address,
    /// Sell amount in the sell token's smallest unit.
    pub sell_amount: U256,
    pub taker: Option<Address>,
}

/// Response of the aggregator quote endpoint (fields used by the builder).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatorQuote {
    pub price: String,
    #[serde(default)]
    pub guaranteed_price: Option<String>,
    pub buy_amount: String,
    #[serde(default)]
    pub sell_amount: Option<String>,
    #[serde(default)]
    pub estimated_gas: Option<String>,
    #[serde(default)]
    pub gas_price: Option<String>,
    #[serde(default)]
    pub estimated_price_impact: Option<String>,
    pub to: String,
    pub data: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub allowance_target: Option<String>,
    #[serde(default)]
    pub sell_token_address: Option<String>,
    #[serde(default)]
    pub buy_token_address: Option<String>,
    #[serde(default)]
    pub sources: Vec<LiquiditySource>,
}

/// Source of live swap quotes.
#[async_trait]
pub trait SwapAggregator: Send + Sync {
    /// Fetch a quote. Any failure is returned as an error; the caller decides
    /// whether to fall back.
    async fn quote(&self, request: &AggregatorRequest) -> Result<AggregatorQuote>;
}

/// Client for the 0x swap API.
pub struct ZeroExClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ZeroExClient {
    /// Create a client whose requests are bounded by `timeout`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Full quote URL.
    pub fn quote_url(&self) -> String {
        format!("{}{}", self.base_url, QUOTE_PATH)
    }

    /// Query parameters for a request.
    pub fn query_params(request: &AggregatorRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("sellToken", format!("{:?}", request.sell_token)),
            ("buyToken", format!("{:?}", request.buy_token)),
            ("sellAmount", request.sell_amount.to_string()),
        ];
        if let Some(taker) = request.taker {
            params.push(("takerAddress", format!("{:?}", taker)));
        }
        params
    }
}

#[async_trait]
impl SwapAggregator for ZeroExClient {
    async fn quote(&self, request: &AggregatorRequest) -> Result<AggregatorQuote> {
        tracing::debug!(
            sell_token = %request.sell_token,
            buy_token = %request.buy_token,
            sell_amount = %request.sell_amount,
            "Requesting aggregator quote"
        );

        let response = self
            .client
            .get(self.quote_url())
            .header("0x-api-key", &self.api_key)
            .query(&Self::query_params(request))
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Aggregator request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Aggregator(format!("status {}: {}", status, body)));
        }

        response
            .json::<AggregatorQuote>()
            .await
            .map_err(|e| AppError::Parse(format!("Failed to parse aggregator quote: {}", e)))
    }
}
