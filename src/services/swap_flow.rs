//! Allowance, approval and swap flow for a single wallet session.
//!
//! [`SwapFlow`] is the UI-independent state machine behind the swap form. It
//! only changes state when an async wallet operation completes, and it
//! records failures as short error text instead of propagating panics.

use std::sync::Arc;

use alloy::primitives::{Address, TxHash, U256};
use serde_json::json;

use crate::{
    error::{AppError, Result},
    ethereum::{constants::UNLIMITED_ALLOWANCE, WalletGateway},
    services::{
        analytics::{events, AnalyticsSink},
        quote::parse_amount,
        quote_client::QuoteSource,
        TokenRegistry,
    },
    types::{Quote, QuoteRequest, SwapData, Token},
};

/// Maximum length of error text kept by the flow.
pub const MAX_ERROR_CHARS: usize = 160;

pub const DEFAULT_FROM_SYMBOL: &str = "DAI";
pub const DEFAULT_TO_SYMBOL: &str = "WETH";
pub const DEFAULT_AMOUNT: &str = "0.5";

pub const CONNECT_WALLET_MESSAGE: &str = "Connect your wallet first.";
pub const WRONG_NETWORK_MESSAGE: &str = "Please switch to Sepolia testnet to get a quote.";
pub const INVALID_AMOUNT_MESSAGE: &str = "Enter a valid amount.";

/// Allowance of the from token for the spender, relative to the entered amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowanceState {
    /// Not read yet, or the key changed since the last read.
    Unknown,
    Sufficient,
    Insufficient,
    /// Approval submitted, waiting for the receipt.
    ApprovalPending(TxHash),
    /// Approval mined and the allowance covers the amount.
    Approved,
}

impl AllowanceState {
    pub fn allows_swap(&self) -> bool {
        matches!(self, AllowanceState::Sufficient | AllowanceState::Approved)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapState {
    Idle,
    Pending(TxHash),
    Confirmed(TxHash),
    Failed(String),
}

/// How much to approve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalAmount {
    /// Exactly the entered amount.
    Exact,
    /// `2^256 - 1`.
    Unlimited,
}

impl ApprovalAmount {
    pub fn resolve(self, exact: U256) -> U256 {
        match self {
            ApprovalAmount::Exact => exact,
            ApprovalAmount::Unlimited => UNLIMITED_ALLOWANCE,
        }
    }
}

/// Truncate error text to [`MAX_ERROR_CHARS`] characters.
pub fn truncate_error(message: &str) -> String {
    message.chars().take(MAX_ERROR_CHARS).collect()
}

/// Swap form state for one connected wallet.
pub struct SwapFlow<G: WalletGateway> {
    gateway: G,
    registry: Arc<TokenRegistry>,
    analytics: Box<dyn AnalyticsSink>,

    address: Option<Address>,
    chain_id: Option<u64>,

    from_symbol: String,
    to_symbol: String,
    amount: String,
    quote: Option<Quote>,

    /// Last allowance read, valid for `allowance_key` (token, spender).
    allowance: Option<U256>,
    allowance_key: Option<(Address, Address)>,
    allowance_state: AllowanceState,

    swap_state: SwapState,
    last_error: Option<String>,
}

impl<G: WalletGateway> SwapFlow<G> {
    pub fn new(
        gateway: G,
        registry: Arc<TokenRegistry>,
        analytics: Box<dyn AnalyticsSink>,
    ) -> Self {
        Self {
            gateway,
            registry,
            analytics,
            address: None,
            chain_id: None,
            from_symbol: DEFAULT_FROM_SYMBOL.to_string(),
            to_symbol: DEFAULT_TO_SYMBOL.to_string(),
            amount: DEFAULT_AMOUNT.to_string(),
            quote: None,
            allowance: None,
            allowance_key: None,
            allowance_state: AllowanceState::Unknown,
            swap_state: SwapState::Idle,
            last_error: None,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn from_symbol(&self) -> &str {
        &self.from_symbol
    }

    pub fn to_symbol(&self) -> &str {
        &self.to_symbol
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn quote(&self) -> Option<&Quote> {
        self.quote.as_ref()
    }

    pub fn allowance(&self) -> Option<U256> {
        self.allowance
    }

    pub fn allowance_state(&self) -> AllowanceState {
        self.allowance_state
    }

    pub fn swap_state(&self) -> &SwapState {
        &self.swap_state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    pub fn on_expected_chain(&self) -> bool {
        self.chain_id == Some(self.registry.chain_id())
    }

    /// Read the wallet address and chain from the gateway.
    pub async fn connect(&mut self) -> Result<Address> {
        let address = self.gateway.address().ok_or(AppError::WalletNotConnected)?;
        let chain_id = self.gateway.chain_id().await?;

        if self.address != Some(address) {
            self.reset_allowance();
        }
        self.address = Some(address);
        self.chain_id = Some(chain_id);

        tracing::info!(address = %address, chain_id, "Wallet connected");
        if !self.on_expected_chain() {
            tracing::warn!(
                expected = self.registry.chain_id(),
                actual = chain_id,
                "Wallet on wrong network"
            );
        }
        Ok(address)
    }

    /// Change the token pair. A new from token invalidates the allowance read.
    pub fn select_pair(&mut self, from_symbol: &str, to_symbol: &str) {
        if self.from_symbol != from_symbol {
            self.reset_allowance();
        }
        self.from_symbol = from_symbol.to_string();
        self.to_symbol = to_symbol.to_string();
        self.clear_quote();
    }

    /// Change the entered amount. The cached allowance is compared again.
    pub fn set_amount(&mut self, amount: &str) {
        self.amount = amount.to_string();
        self.clear_quote();
        self.evaluate_allowance();
    }

    pub fn from_token(&self) -> Option<&Token> {
        self.registry.resolve_symbol(&self.from_symbol)
    }

    fn require_from_token(&self) -> Result<&Token> {
        self.registry.require_symbol(&self.from_symbol)
    }

    /// Entered amount in the from token's smallest unit, if it is valid.
    pub fn amount_in_units(&self) -> Option<U256> {
        let token = self.from_token()?;
        let amount = parse_amount(&self.amount).ok()?;
        token.to_units(&amount).ok().filter(|units| !units.is_zero())
    }

    /// Whether an approval is required before swapping.
    ///
    /// An allowance that has not been read yet counts as zero.
    pub fn needs_approval(&self) -> bool {
        if !self.is_connected() {
            return false;
        }
        match self.amount_in_units() {
            Some(units) => self.allowance.unwrap_or(U256::ZERO) < units,
            None => false,
        }
    }

    /// Checks run before a quote is requested; the error is the text shown to the user.
    pub fn validate_quote_request(&self) -> std::result::Result<QuoteRequest, &'static str> {
        let Some(address) = self.address else {
            return Err(CONNECT_WALLET_MESSAGE);
        };
        if !self.on_expected_chain() {
            return Err(WRONG_NETWORK_MESSAGE);
        }
        if parse_amount(&self.amount).is_err() {
            return Err(INVALID_AMOUNT_MESSAGE);
        }
        Ok(QuoteRequest::new(&self.from_symbol, &self.to_symbol, &self.amount)
            .with_wallet(format!("{:?}", address)))
    }

    /// Request a quote for the current form values.
    ///
    /// A received quote is followed by an allowance read. A failed read only
    /// sets the last error.
    pub async fn request_quote<S>(&mut self, source: &S) -> Result<&Quote>
    where
        S: QuoteSource + ?Sized,
    {
        let request = match self.validate_quote_request() {
            Ok(request) => request,
            Err(message) => {
                self.last_error = Some(message.to_string());
                return Err(AppError::SwapNotReady(message.to_string()));
            }
        };

        self.clear_quote();
        self.last_error = None;
        self.analytics.capture(
            events::QUOTE_REQUESTED,
            json!({
                "chainId": self.chain_id,
                "tokenA": self.from_symbol,
                "tokenB": self.to_symbol,
                "amount": self.amount,
            }),
        );

        match source.fetch_quote(&request).await {
            Ok(quote) => {
                self.analytics.capture(
                    events::QUOTE_RECEIVED,
                    json!({
                        "fromToken": self.from_symbol,
                        "toToken": self.to_symbol,
                        "amountIn": quote.from_amount,
                        "amountOut": quote.to_amount,
                        "est_slippage": quote.estimated_slippage_percent,
                    }),
                );
                tracing::info!(
                    to_amount = %quote.to_amount,
                    is_mock = quote.is_mock(),
                    "Quote received"
                );
                if let Err(e) = self.refresh_allowance().await {
                    tracing::warn!(error = %e, "Allowance read after quote failed");
                }
                Ok(&*self.quote.insert(quote))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Quote request failed");
                self.last_error = Some(truncate_error(&e.to_string()));
                Err(e)
            }
        }
    }

    /// Read the allowance of the from token for the registry spender.
    pub async fn refresh_allowance(&mut self) -> Result<U256> {
        let owner = self.address.ok_or(AppError::WalletNotConnected)?;
        let token = self.require_from_token()?;
        let key = (token.address, self.registry.spender().address);

        let allowance = self.gateway.allowance(key.0, owner, key.1).await.map_err(|e| {
            self.last_error = Some(truncate_error(&e.to_string()));
            e
        })?;

        tracing::debug!(token = %key.0, spender = %key.1, allowance = %allowance, "Allowance read");
        self.allowance = Some(allowance);
        self.allowance_key = Some(key);
        self.evaluate_allowance();
        Ok(allowance)
    }

    /// Submit an approval for the from token.
    pub async fn submit_approval(&mut self, amount: ApprovalAmount) -> Result<TxHash> {
        if !self.is_connected() {
            return Err(AppError::WalletNotConnected);
        }
        let token_address = self.require_from_token()?.address;
        let units =
            self.amount_in_units().ok_or_else(|| AppError::InvalidAmount(self.amount.clone()))?;
        let spender = self.registry.spender().address;
        let value = amount.resolve(units);

        match self.gateway.approve(token_address, spender, value).await {
            Ok(hash) => {
                self.allowance_key = Some((token_address, spender));
                self.allowance_state = AllowanceState::ApprovalPending(hash);
                self.last_error = None;
                self.analytics.capture(
                    events::APPROVAL_SUBMITTED,
                    json!({
                        "token": self.from_symbol,
                        "unlimited": amount == ApprovalAmount::Unlimited,
                        "txHash": hash.to_string(),
                    }),
                );
                Ok(hash)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Approval submission failed");
                self.last_error = Some(truncate_error(&e.to_string()));
                Err(e)
            }
        }
    }

    /// Wait for the pending approval, then re-read the allowance.
    pub async fn confirm_approval(&mut self) -> Result<()> {
        let AllowanceState::ApprovalPending(hash) = self.allowance_state else {
            return Err(AppError::PendingTransaction("no approval pending".to_string()));
        };

        let mined = self.gateway.wait_for_receipt(hash).await;
        match mined {
            Ok(true) => {
                self.allowance_state = AllowanceState::Approved;
                self.analytics.capture(
                    events::APPROVAL_CONFIRMED,
                    json!({ "token": self.from_symbol, "txHash": hash.to_string() }),
                );
                self.refresh_allowance().await.map(|_| ())
            }
            Ok(false) => {
                let message = format!("Approval transaction {} reverted", hash);
                tracing::warn!(tx_hash = %hash, "Approval reverted");
                self.last_error = Some(truncate_error(&message));
                self.allowance_state = AllowanceState::Unknown;
                self.evaluate_allowance();
                Err(AppError::PendingTransaction(message))
            }
            Err(e) => {
                self.last_error = Some(truncate_error(&e.to_string()));
                self.allowance_state = AllowanceState::Unknown;
                self.evaluate_allowance();
                Err(e)
            }
        }
    }

    /// Submit an approval and wait for it.
    pub async fn approve(&mut self, amount: ApprovalAmount) -> Result<()> {
        self.submit_approval(amount).await?;
        self.confirm_approval().await
    }

    /// The swap payload, or the reason the swap cannot be sent yet.
    pub fn swap_readiness(&self) -> Result<&SwapData> {
        if !self.is_connected() {
            return Err(AppError::WalletNotConnected);
        }
        if !self.on_expected_chain() {
            return Err(AppError::WrongNetwork {
                expected: self.registry.chain_id(),
                actual: self.chain_id.unwrap_or_default(),
            });
        }
        let quote = self.quote.as_ref().ok_or_else(|| not_ready("no quote"))?;
        if quote.is_mock() {
            return Err(not_ready("mock quotes cannot be executed"));
        }
        let swap_data =
            quote.swap_data.as_ref().ok_or_else(|| not_ready("quote has no swap data"))?;
        if !self.allowance_state.allows_swap() {
            return Err(not_ready("allowance is not sufficient"));
        }
        match self.swap_state {
            SwapState::Pending(_) => Err(not_ready("a swap is already pending")),
            SwapState::Confirmed(_) => {
                Err(not_ready("swap already confirmed, request a new quote"))
            }
            SwapState::Idle | SwapState::Failed(_) => Ok(swap_data),
        }
    }

    pub fn can_swap(&self) -> bool {
        self.swap_readiness().is_ok()
    }

    /// Send the quote's swap transaction.
    pub async fn submit_swap(&mut self) -> Result<TxHash> {
        let swap_data = self.swap_readiness()?.clone();

        match self.gateway.send_transaction(&swap_data).await {
            Ok(hash) => {
                self.swap_state = SwapState::Pending(hash);
                self.last_error = None;
                self.analytics.capture(
                    events::SWAP_SUBMITTED,
                    json!({
                        "tokenA": self.from_symbol,
                        "tokenB": self.to_symbol,
                        "amountIn": self.amount,
                        "txHash": hash.to_string(),
                    }),
                );
                Ok(hash)
            }
            Err(e) => {
                self.fail_swap(&e.to_string());
                Err(e)
            }
        }
    }

    /// Wait for the pending swap. Returns whether it succeeded.
    ///
    /// A mined swap re-reads the allowance, since it spent some of it. A
    /// failed read only sets the last error.
    pub async fn confirm_swap(&mut self) -> Result<bool> {
        let SwapState::Pending(hash) = self.swap_state else {
            return Err(AppError::PendingTransaction("no swap pending".to_string()));
        };

        match self.gateway.wait_for_receipt(hash).await {
            Ok(true) => {
                self.swap_state = SwapState::Confirmed(hash);
                self.analytics
                    .capture(events::SWAP_CONFIRMED, json!({ "txHash": hash.to_string() }));
                if let Err(e) = self.refresh_allowance().await {
                    tracing::warn!(error = %e, "Allowance read after swap failed");
                }
                Ok(true)
            }
            Ok(false) => {
                self.fail_swap(&format!("Swap transaction {} reverted", hash));
                Ok(false)
            }
            Err(e) => {
                self.fail_swap(&e.to_string());
                Err(e)
            }
        }
    }

    /// Submit the swap and wait for it.
    pub async fn swap(&mut self) -> Result<bool> {
        self.submit_swap().await?;
        self.confirm_swap().await
    }

    fn fail_swap(&mut self, message: &str) {
        let message = truncate_error(message);
        tracing::warn!(error = %message, "Swap failed");
        self.analytics.capture(events::SWAP_FAILED, json!({ "error": message }));
        self.last_error = Some(message.clone());
        self.swap_state = SwapState::Failed(message);
    }

    fn clear_quote(&mut self) {
        self.quote = None;
        if !matches!(self.swap_state, SwapState::Pending(_)) {
            self.swap_state = SwapState::Idle;
        }
    }

    fn reset_allowance(&mut self) {
        self.allowance = None;
        self.allowance_key = None;
        self.allowance_state = AllowanceState::Unknown;
    }

    /// Recompute the allowance state from the cached read and the amount.
    fn evaluate_allowance(&mut self) {
        if matches!(self.allowance_state, AllowanceState::ApprovalPending(_)) {
            return;
        }
        let current_key = self.from_token().map(|t| (t.address, self.registry.spender().address));
        if self.allowance_key.is_none() || self.allowance_key != current_key {
            self.allowance_state = AllowanceState::Unknown;
            return;
        }

        self.allowance_state = match (self.allowance, self.amount_in_units()) {
            (Some(allowance), Some(units)) if allowance >= units => {
                if self.allowance_state == AllowanceState::Approved {
                    AllowanceState::Approved
                } else {
                    AllowanceState::Sufficient
                }
            }
            (Some(_), Some(_)) => AllowanceState::Insufficient,
            _ => AllowanceState::Unknown,
        };
    }
}

fn not_ready(reason: &str) -> AppError {
    AppError::SwapNotReady(reason.to_string())
}
