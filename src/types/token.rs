//! Token-related types and unit conversion helpers.

use alloy::primitives::{Address, U256};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::Amount;
use crate::error::Result;

/// A token known to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token symbol, unique within the registry (e.g., "DAI").
    pub symbol: String,
    /// Display name.
    pub name: String,
    /// Token contract address.
    pub address: Address,
    /// Number of decimals.
    pub decimals: u8,
}

impl Token {
    pub fn new(symbol: &str, name: &str, address: Address, decimals: u8) -> Self {
        Self { symbol: symbol.to_string(), name: name.to_string(), address, decimals }
    }

    /// Convert a human-readable amount into this token's smallest unit.
    pub fn to_units(&self, amount: &Amount) -> Result<U256> {
        amount.to_units(self.decimals)
    }

    /// Format a smallest-unit amount of this token for display.
    pub fn format(&self, value: U256) -> String {
        format_units(value, self.decimals)
    }
}

/// A contract allowed to move tokens on the user's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpenderConfig {
    /// Display name.
    pub name: String,
    /// Spender contract address.
    pub address: Address,
}

/// Format a U256 value with decimals to a human-readable string.
pub fn format_units(value: U256, decimals: u8) -> String {
    if value == U256::ZERO {
        return "0".to_string();
    }

    let value_str = value.to_string();
    let decimals = decimals as usize;

    if decimals == 0 {
        return value_str;
    }

    let len = value_str.len();
    if len <= decimals {
        let zeros = decimals - len;
        let decimal_part = value_str.trim_end_matches('0');
        format!("0.{}{}", "0".repeat(zeros), decimal_part)
    } else {
        let (integer, decimal) = value_str.split_at(len - decimals);
        let decimal = decimal.trim_end_matches('0');
        if decimal.is_empty() {
            integer.to_string()
        } else {
            format!("{}.{}", integer, decimal)
        }
    }
}

/// Render a Decimal with exactly `dp` fractional digits, rounding half away from zero.
pub fn to_fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded.to_string()
}
