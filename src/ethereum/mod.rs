//! Ethereum interaction module.
//!
//! Contains the Ethereum client, wallet management, the wallet gateway used
//! by the swap flow, and contract bindings.

pub mod client;
pub mod constants;
pub mod contracts;
pub mod gateway;
pub mod wallet;

pub use client::{EthereumClient, HttpProvider};
pub use gateway::{RpcWalletGateway, WalletGateway};
pub use wallet::WalletManager;
