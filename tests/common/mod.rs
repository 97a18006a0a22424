//! Common utilities for integration tests.
#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc, Mutex,
    },
};

use alloy::primitives::{address, Address, TxHash, U256};
use async_trait::async_trait;
use axum::Router;
use serde_json::Value;

use sepolia_swap_demo::{
    api::{router, AppState},
    error::{AppError, Result},
    ethereum::{EthereumClient, RpcWalletGateway, WalletGateway, WalletManager},
    services::{analytics::AnalyticsSink, QuoteSource},
    types::{Quote, QuoteRequest, SwapData},
    QuoteBuilder, TokenRegistry, SEPOLIA_CHAIN_ID,
};

pub const OWNER: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

/// Start the HTTP router on an ephemeral port and return its base URL.
pub async fn spawn_server(builder: QuoteBuilder) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(AppState::new(builder));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn mock_builder() -> QuoteBuilder {
    QuoteBuilder::new(Arc::new(TokenRegistry::sepolia()))
}

/// Start a stand-in aggregator on an ephemeral port and return its base URL.
///
/// `app` should route `QUOTE_PATH` (`/swap/v1/quote`).
pub async fn spawn_aggregator(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// In-memory wallet. Approvals and swap spends take effect when their
/// receipt is awaited.
pub struct FakeWallet {
    address: Option<Address>,
    chain_id: u64,
    allowance: Mutex<U256>,
    pending_approvals: Mutex<HashMap<TxHash, U256>>,
    pending_swaps: Mutex<HashSet<TxHash>>,
    swap_spend: U256,
    pub sent: Mutex<Vec<SwapData>>,
    send_error: Option<String>,
    reverts: bool,
    nonce: AtomicU8,
}

impl FakeWallet {
    pub fn new() -> Self {
        Self {
            address: Some(OWNER),
            chain_id: SEPOLIA_CHAIN_ID,
            allowance: Mutex::new(U256::ZERO),
            pending_approvals: Mutex::new(HashMap::new()),
            pending_swaps: Mutex::new(HashSet::new()),
            swap_spend: U256::ZERO,
            sent: Mutex::new(Vec::new()),
            send_error: None,
            reverts: false,
            nonce: AtomicU8::new(1),
        }
    }

    pub fn disconnected() -> Self {
        Self { address: None, ..Self::new() }
    }

    pub fn on_chain(chain_id: u64) -> Self {
        Self { chain_id, ..Self::new() }
    }

    pub fn with_allowance(self, allowance: U256) -> Self {
        *self.allowance.lock().unwrap() = allowance;
        self
    }

    /// Each mined swap spends `amount` of a finite allowance.
    pub fn with_swap_spend(self, amount: U256) -> Self {
        Self { swap_spend: amount, ..self }
    }

    pub fn current_allowance(&self) -> U256 {
        *self.allowance.lock().unwrap()
    }

    pub fn reverting(self) -> Self {
        Self { reverts: true, ..self }
    }

    pub fn failing_sends(self, message: &str) -> Self {
        Self { send_error: Some(message.to_string()), ..self }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    fn next_hash(&self) -> TxHash {
        TxHash::with_last_byte(self.nonce.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl WalletGateway for FakeWallet {
    fn address(&self) -> Option<Address> {
        self.address
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }

    async fn allowance(&self, _token: Address, _owner: Address, _spender: Address) -> Result<U256> {
        Ok(*self.allowance.lock().unwrap())
    }

    async fn approve(&self, _token: Address, _spender: Address, amount: U256) -> Result<TxHash> {
        let hash = self.next_hash();
        self.pending_approvals.lock().unwrap().insert(hash, amount);
        Ok(hash)
    }

    async fn send_transaction(&self, swap_data: &SwapData) -> Result<TxHash> {
        if let Some(message) = &self.send_error {
            return Err(AppError::Wallet(message.clone()));
        }
        self.sent.lock().unwrap().push(swap_data.clone());
        let hash = self.next_hash();
        self.pending_swaps.lock().unwrap().insert(hash);
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<bool> {
        if self.reverts {
            return Ok(false);
        }
        if let Some(amount) = self.pending_approvals.lock().unwrap().remove(&hash) {
            *self.allowance.lock().unwrap() = amount;
        }
        if self.pending_swaps.lock().unwrap().remove(&hash) {
            let mut allowance = self.allowance.lock().unwrap();
            if *allowance != U256::MAX {
                *allowance = allowance.saturating_sub(self.swap_spend);
            }
        }
        Ok(true)
    }
}

/// Analytics sink that records event names.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub events: Arc<Mutex<Vec<(String, Value)>>>,
}

impl RecordingSink {
    pub fn names(&self) -> Vec<String> {
        self.events.lock().unwrap().iter().map(|(name, _)| name.clone()).collect()
    }
}

impl AnalyticsSink for RecordingSink {
    fn capture(&self, event: &str, properties: Value) {
        self.events.lock().unwrap().push((event.to_string(), properties));
    }
}

/// Quote source that always returns the same executable quote.
pub struct FixedQuoteSource(pub Quote);

impl FixedQuoteSource {
    pub fn live() -> Self {
        Self(Quote {
            price: "0.000500".to_string(),
            from_amount: "10".to_string(),
            to_amount: "0.005000".to_string(),
            estimated_gas_eth: "0.0003".to_string(),
            estimated_slippage_percent: 0.12,
            swap_data: Some(SwapData {
                to: "0xdef1c0ded9bec7f1a1670819833240f027b25eff".to_string(),
                data: "0xd9627aa4".to_string(),
                value: "0".to_string(),
            }),
            sell_token_address: None,
            buy_token_address: None,
            sell_amount_wei: None,
            buy_amount_wei: None,
            min_buy_amount_wei: None,
            allowance_target: None,
            sources: None,
            is_mock: None,
        })
    }
}

#[async_trait]
impl QuoteSource for FixedQuoteSource {
    async fn fetch_quote(&self, _request: &QuoteRequest) -> Result<Quote> {
        Ok(self.0.clone())
    }
}

/// Helper to create an RPC wallet gateway from environment variables.
pub fn create_live_gateway() -> Option<RpcWalletGateway> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let rpc_url = std::env::var("ETHEREUM_RPC_URL").ok().filter(|s| !s.is_empty())?;
    let private_key = std::env::var("ETHEREUM_PRIVATE_KEY").ok().filter(|s| !s.is_empty())?;

    let client = EthereumClient::new(&rpc_url).ok()?;
    let wallet = WalletManager::from_private_key(&private_key).ok()?;
    RpcWalletGateway::new(client, wallet).ok()
}

/// Skip test if the gateway cannot be created (missing env vars).
#[macro_export]
macro_rules! skip_if_no_gateway {
    () => {
        match common::create_live_gateway() {
            Some(gateway) => gateway,
            None => {
                eprintln!("Skipping test: ETHEREUM_RPC_URL or ETHEREUM_PRIVATE_KEY not set");
                return;
            }
        }
    };
}
