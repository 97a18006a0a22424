//! Token and spender registry.
//!
//! The registry is built once at startup and shared immutably by reference
//! between the quote builder, the HTTP layer and the swap flow.

use std::collections::HashMap;

use alloy::primitives::Address;

use crate::{
    error::{AppError, Result},
    ethereum::constants::{
        SEPOLIA_CHAIN_ID, SEPOLIA_DAI_ADDRESS, SEPOLIA_SPENDER_ADDRESS, SEPOLIA_SPENDER_NAME,
        SEPOLIA_USDC_ADDRESS, SEPOLIA_WETH_ADDRESS,
    },
    types::{SpenderConfig, Token},
};

/// Immutable symbol → token mapping plus the default spender.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    /// Chain the registry addresses belong to.
    chain_id: u64,
    /// Tokens in declaration order.
    tokens: Vec<Token>,
    /// Index into `tokens` by symbol.
    by_symbol: HashMap<String, usize>,
    /// Index into `tokens` by address.
    by_address: HashMap<Address, usize>,
    /// Contract the user approves before swapping.
    spender: SpenderConfig,
}

impl TokenRegistry {
    /// Build a registry from explicit tokens.
    ///
    /// # Errors
    /// Returns a configuration error on duplicate symbols or addresses.
    pub fn new(chain_id: u64, tokens: Vec<Token>, spender: SpenderConfig) -> Result<Self> {
        let mut by_symbol = HashMap::with_capacity(tokens.len());
        let mut by_address = HashMap::with_capacity(tokens.len());

        for (index, token) in tokens.iter().enumerate() {
            if by_symbol.insert(token.symbol.clone(), index).is_some() {
                return Err(AppError::Config(format!("Duplicate token symbol: {}", token.symbol)));
            }
            if by_address.insert(token.address, index).is_some() {
                return Err(AppError::Config(format!("Duplicate token address: {}", token.address)));
            }
        }

        Ok(Self { chain_id, tokens, by_symbol, by_address, spender })
    }

    /// The Sepolia registry used by the demo.
    pub fn sepolia() -> Self {
        let tokens = vec![
            Token::new("DAI", "Dai Stablecoin (testnet)", SEPOLIA_DAI_ADDRESS, 18),
            Token::new("WETH", "Wrapped Ether (testnet)", SEPOLIA_WETH_ADDRESS, 18),
            Token::new("USDC", "USD Coin (testnet)", SEPOLIA_USDC_ADDRESS, 6),
        ];
        let spender = SpenderConfig {
            name: SEPOLIA_SPENDER_NAME.to_string(),
            address: SEPOLIA_SPENDER_ADDRESS,
        };

        // Symbols and addresses above are distinct, so construction cannot fail.
        let by_symbol = tokens.iter().enumerate().map(|(i, t)| (t.symbol.clone(), i)).collect();
        let by_address = tokens.iter().enumerate().map(|(i, t)| (t.address, i)).collect();
        Self { chain_id: SEPOLIA_CHAIN_ID, tokens, by_symbol, by_address, spender }
    }

    /// Chain ID the registry targets.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Resolve a symbol (case-sensitive) to a token.
    pub fn resolve_symbol(&self, symbol: &str) -> Option<&Token> {
        self.by_symbol.get(symbol).map(|&i| &self.tokens[i])
    }

    /// Resolve a symbol, failing with `UnknownToken`.
    pub fn require_symbol(&self, symbol: &str) -> Result<&Token> {
        self.resolve_symbol(symbol).ok_or_else(|| AppError::UnknownToken(symbol.to_string()))
    }

    /// Look up a token by address.
    pub fn lookup_address(&self, address: Address) -> Option<&Token> {
        self.by_address.get(&address).map(|&i| &self.tokens[i])
    }

    /// All tokens in declaration order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The default spender.
    pub fn spender(&self) -> &SpenderConfig {
        &self.spender
    }
}
