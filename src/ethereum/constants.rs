//! Ethereum network constants.
//!
//! Contains the chain ID and Sepolia contract addresses used by the demo.

use alloy::primitives::{address, Address, U256};

// ============================================================================
// Chain IDs
// ============================================================================

/// Sepolia testnet chain ID.
pub const SEPOLIA_CHAIN_ID: u64 = 11155111;

// ============================================================================
// Token Addresses (Sepolia)
// ============================================================================

/// Dai Stablecoin (testnet) on Sepolia.
pub const SEPOLIA_DAI_ADDRESS: Address = address!("ff34b3d4aee8ddcd6f9afffb6fe49bd371b8a357");

/// Wrapped Ether (testnet) on Sepolia.
pub const SEPOLIA_WETH_ADDRESS: Address = address!("7b79995e5f793a07bc00c21412e50ecae098e7f9");

/// USD Coin (testnet) on Sepolia.
pub const SEPOLIA_USDC_ADDRESS: Address = address!("1c7d4b196cb0c7b01d743fbc6116a902379c7238");

// ============================================================================
// Spender
// ============================================================================

/// Default spender the user approves before swapping.
pub const SEPOLIA_SPENDER_ADDRESS: Address = address!("000000000022d473030f116ddee9f6b43ac78ba3");

/// Display name of the default spender.
pub const SEPOLIA_SPENDER_NAME: &str = "Swap Router (0x-style stub)";

/// Largest approvable amount for a uint256 allowance.
pub const UNLIMITED_ALLOWANCE: U256 = U256::MAX;
