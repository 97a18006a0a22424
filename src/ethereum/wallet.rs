//! Wallet management.

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};

use crate::error::{AppError, Result};

/// Wallet manager for transaction signing.
#[derive(Clone)]
pub struct WalletManager {
    /// The local signer.
    signer: PrivateKeySigner,
    /// Wallet address.
    address: Address,
}

impl WalletManager {
    /// Create a wallet manager from a private key string.
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let key = private_key.strip_prefix("0x").unwrap_or(private_key);

        let signer: PrivateKeySigner =
            key.parse().map_err(|e: alloy::signers::local::LocalSignerError| {
                AppError::Wallet(e.to_string())
            })?;

        let address = signer.address();

        tracing::info!(address = %address, "Wallet initialized");

        Ok(Self { signer, address })
    }

    /// Get the wallet address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Get the signer for transaction signing.
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// Build a provider that signs and broadcasts with this wallet.
    pub fn signing_provider(&self, rpc_url: &str) -> Result<DynProvider<Ethereum>> {
        let url = rpc_url
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid RPC URL: {}", rpc_url)))?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(self.signer.clone()))
            .connect_http(url)
            .erased();

        Ok(provider)
    }
}

impl std::fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletManager").field("address", &self.address).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known Hardhat/Foundry development key. Never fund it.
    const TEST_PRIVATE_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_wallet_from_private_key() {
        let wallet = WalletManager::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let addr_str = format!("{:?}", wallet.address()).to_lowercase();
        assert_eq!(addr_str, "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
        assert_eq!(wallet.signer().address(), wallet.address());
    }

    #[test]
    fn test_wallet_invalid_private_key() {
        assert!(WalletManager::from_private_key("0x1234").is_err());
        assert!(WalletManager::from_private_key("0xZZZZ").is_err());
        assert!(matches!(WalletManager::from_private_key(""), Err(AppError::Wallet(_))));
    }

    #[test]
    fn test_wallet_debug_hides_key() {
        let wallet = WalletManager::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let debug_str = format!("{:?}", wallet);
        assert!(debug_str.contains("WalletManager"));
        assert!(
            !debug_str.contains("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80")
        );
    }

    #[test]
    fn test_signing_provider_rejects_bad_url() {
        let wallet = WalletManager::from_private_key(TEST_PRIVATE_KEY).unwrap();
        assert!(matches!(wallet.signing_provider("not a url"), Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_signing_provider_builds_without_network() {
        let wallet = WalletManager::from_private_key(TEST_PRIVATE_KEY).unwrap();
        assert!(wallet.signing_provider("http://127.0.0.1:8545").is_ok());
    }
}
