//! Error types and handling module.
//!
//! Defines all application-specific error types, the HTTP error codes
//! returned by the quote endpoint, and conversions between them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Ethereum RPC errors.
    #[error("Ethereum RPC error: {0}")]
    Rpc(String),

    /// Transport errors.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid Ethereum address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Symbol not present in the token registry.
    #[error("Unknown token symbol: {0}")]
    UnknownToken(String),

    /// Amount is not a finite positive number.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Swap aggregator returned an error or an unusable response.
    #[error("Aggregator error: {0}")]
    Aggregator(String),

    /// Wallet-related errors.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// No wallet address is available for the session.
    #[error("Wallet not connected")]
    WalletNotConnected,

    /// Wallet is on a different chain than the demo supports.
    #[error("Wrong network: expected chain {expected}, got {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    /// The quote endpoint rejected a request.
    #[error("Quote request failed ({status}): {message}")]
    QuoteRejected { status: u16, message: String },

    /// Swap preconditions are not met.
    #[error("Swap not ready: {0}")]
    SwapNotReady(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Numeric overflow during conversion.
    #[error("Numeric overflow: {0}")]
    NumericOverflow(String),

    /// Pending transaction error.
    #[error("Pending transaction error: {0}")]
    PendingTransaction(String),
}

impl From<alloy::transports::TransportError> for AppError {
    fn from(err: alloy::transports::TransportError) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<alloy::contract::Error> for AppError {
    fn from(err: alloy::contract::Error) -> Self {
        AppError::Rpc(err.to_string())
    }
}

impl From<alloy::signers::local::LocalSignerError> for AppError {
    fn from(err: alloy::signers::local::LocalSignerError) -> Self {
        AppError::Wallet(err.to_string())
    }
}

impl From<alloy::hex::FromHexError> for AppError {
    fn from(err: alloy::hex::FromHexError) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(err: std::num::ParseIntError) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes returned by the quote endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// A required field is absent or has the wrong JSON type.
    MissingParams,
    /// Amount does not parse to a finite positive number.
    InvalidAmount,
    /// Symbol is not in the token registry.
    UnknownToken,
    /// Any other failure while building the quote.
    QuoteError,
}

/// Error body returned by the HTTP API, always with status 400.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(error: ErrorKind, message: impl Into<String>) -> Self {
        Self { error, message: message.into() }
    }

    pub fn missing_params() -> Self {
        Self::new(ErrorKind::MissingParams, "fromSymbol, toSymbol and amount are required.")
    }

    pub fn invalid_amount() -> Self {
        Self::new(ErrorKind::InvalidAmount, "Amount must be a positive number.")
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::UnknownToken(_) => ApiError::new(ErrorKind::UnknownToken, err.to_string()),
            AppError::InvalidAmount(_) => ApiError::invalid_amount(),
            _ => ApiError::new(ErrorKind::QuoteError, err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}
