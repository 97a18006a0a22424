//! Quote-related types.

use serde::{Deserialize, Serialize};

/// Transaction payload returned with a quote, ready to be sent by the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapData {
    /// Target contract address.
    pub to: String,
    /// Calldata (hex encoded).
    pub data: String,
    /// Native value in wei (decimal string).
    pub value: String,
}

/// A liquidity source contributing to a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquiditySource {
    pub name: String,
    pub proportion: String,
}

/// Price quote returned by `POST /api/quote`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Units of the buy token per unit of the sell token, 6 decimal places.
    pub price: String,
    /// Normalized input amount.
    pub from_amount: String,
    /// `from_amount * price`, 6 decimal places.
    pub to_amount: String,
    /// Estimated gas cost in ETH.
    pub estimated_gas_eth: String,
    /// Estimated slippage as a percentage.
    pub estimated_slippage_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap_data: Option<SwapData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_token_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_token_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_amount_wei: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_amount_wei: Option<String>,
    /// Slippage-protected minimum output in smallest units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_buy_amount_wei: Option<String>,
    /// Contract that must be approved to spend the sell token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowance_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<LiquiditySource>>,
    /// Present and `true` only when the quote was built from the local price table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_mock: Option<bool>,
}

impl Quote {
    /// Whether this quote came from the local mock price table.
    pub fn is_mock(&self) -> bool {
        self.is_mock.unwrap_or(false)
    }
}

/// Result of building a quote: live aggregator data or the local fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
    Live(Quote),
    Mock(Quote),
}

impl QuoteOutcome {
    pub fn is_mock(&self) -> bool {
        matches!(self, QuoteOutcome::Mock(_))
    }

    pub fn quote(&self) -> &Quote {
        match self {
            QuoteOutcome::Live(quote) | QuoteOutcome::Mock(quote) => quote,
        }
    }

    pub fn into_quote(self) -> Quote {
        match self {
            QuoteOutcome::Live(quote) | QuoteOutcome::Mock(quote) => quote,
        }
    }
}

/// Body of `POST /api/quote`.
///
/// `amount` stays a raw JSON value so a non-string amount can be reported as a
/// missing parameter rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

impl QuoteRequest {
    pub fn new(from_symbol: &str, to_symbol: &str, amount: &str) -> Self {
        Self {
            from_symbol: Some(from_symbol.to_string()),
            to_symbol: Some(to_symbol.to_string()),
            amount: Some(serde_json::Value::String(amount.to_string())),
            wallet_address: None,
        }
    }

    pub fn with_wallet(mut self, wallet_address: impl Into<String>) -> Self {
        self.wallet_address = Some(wallet_address.into());
        self
    }
}
