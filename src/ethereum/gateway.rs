//! Wallet gateway: the wallet-side operations the swap flow depends on.

use std::time::{Duration, Instant};

use alloy::{
    network::{Ethereum, TransactionBuilder},
    primitives::{Address, Bytes, TxHash, U256},
    providers::{DynProvider, Provider},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};
use async_trait::async_trait;

use crate::{
    error::{AppError, Result},
    ethereum::{contracts::erc20::IERC20, EthereumClient, WalletManager},
    types::SwapData,
};

/// Interval between receipt polls.
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How long to wait for a receipt before giving up.
pub const RECEIPT_TIMEOUT: Duration = Duration::from_secs(180);

/// Operations the swap flow needs from a connected wallet.
///
/// Implemented over JSON-RPC by [`RpcWalletGateway`]; tests provide in-memory
/// implementations.
#[async_trait]
pub trait WalletGateway: Send + Sync {
    /// Connected wallet address, if any.
    fn address(&self) -> Option<Address>;

    /// Chain the wallet is connected to.
    async fn chain_id(&self) -> Result<u64>;

    /// ERC20 allowance `owner` has granted `spender` on `token`.
    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    /// Submit an ERC20 approve transaction.
    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash>;

    /// Submit an arbitrary transaction built from quote swap data.
    async fn send_transaction(&self, swap_data: &SwapData) -> Result<TxHash>;

    /// Wait until the transaction is mined. Returns whether it succeeded.
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<bool>;
}

/// Convert quote swap data into a transaction request.
pub fn swap_transaction_request(swap_data: &SwapData, from: Address) -> Result<TransactionRequest> {
    let to = swap_data
        .to
        .parse::<Address>()
        .map_err(|e| AppError::InvalidAddress(format!("{}: {}", swap_data.to, e)))?;
    let data = alloy::hex::decode(&swap_data.data)?;
    let value = if swap_data.value.is_empty() {
        U256::ZERO
    } else {
        swap_data
            .value
            .parse::<U256>()
            .map_err(|e| AppError::Parse(format!("Invalid value '{}': {}", swap_data.value, e)))?
    };

    Ok(TransactionRequest::default()
        .with_from(from)
        .with_to(to)
        .with_input(Bytes::from(data))
        .with_value(value))
}

/// Build an ERC20 approve transaction request.
pub fn approve_transaction_request(
    token: Address,
    spender: Address,
    amount: U256,
    from: Address,
) -> TransactionRequest {
    let calldata = IERC20::approveCall { spender, amount }.abi_encode();
    TransactionRequest::default().with_from(from).with_to(token).with_input(Bytes::from(calldata))
}

/// Wallet gateway backed by an RPC node and a local signer.
pub struct RpcWalletGateway {
    client: EthereumClient,
    wallet: WalletManager,
    signer: DynProvider<Ethereum>,
}

impl RpcWalletGateway {
    pub fn new(client: EthereumClient, wallet: WalletManager) -> Result<Self> {
        let signer = wallet.signing_provider(client.rpc_url())?;
        Ok(Self { client, wallet, signer })
    }

    async fn submit(&self, tx: TransactionRequest) -> Result<TxHash> {
        let pending = self.signer.send_transaction(tx).await?;
        let hash = *pending.tx_hash();
        tracing::info!(tx_hash = %hash, "Transaction submitted");
        Ok(hash)
    }
}

#[async_trait]
impl WalletGateway for RpcWalletGateway {
    fn address(&self) -> Option<Address> {
        Some(self.wallet.address())
    }

    async fn chain_id(&self) -> Result<u64> {
        self.client.chain_id().await
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        tracing::debug!(token = %token, owner = %owner, spender = %spender, "Reading allowance");
        self.client.erc20_allowance(token, owner, spender).await
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash> {
        let tx = approve_transaction_request(token, spender, amount, self.wallet.address());
        self.submit(tx).await
    }

    async fn send_transaction(&self, swap_data: &SwapData) -> Result<TxHash> {
        let tx = swap_transaction_request(swap_data, self.wallet.address())?;
        self.submit(tx).await
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<bool> {
        let started = Instant::now();
        loop {
            if let Some(status) = self.client.transaction_status(hash).await? {
                tracing::info!(tx_hash = %hash, success = status, "Transaction mined");
                return Ok(status);
            }
            if started.elapsed() > RECEIPT_TIMEOUT {
                return Err(AppError::PendingTransaction(format!(
                    "no receipt for {} after {}s",
                    hash,
                    RECEIPT_TIMEOUT.as_secs()
                )));
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}
