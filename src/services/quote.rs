//! Quote construction service.

use std::{str::FromStr, sync::Arc};

use alloy::{
    primitives::{Address, U256},
    sol_types::SolCall,
};
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::{
    config::Config,
    error::{ApiError, AppError, Result},
    ethereum::contracts::uniswap_v2::IUniswapV2Router02,
    services::{
        aggregator::{AggregatorQuote, AggregatorRequest, SwapAggregator, ZeroExClient},
        price::MockPriceTable,
        quote_client::QuoteSource,
        TokenRegistry,
    },
    types::{
        format_units, to_fixed, Amount, LiquiditySource, Quote, QuoteOutcome, QuoteRequest,
        SwapData, Token,
    },
};

/// Fractional digits of `price` and `toAmount`.
pub const QUOTE_DECIMALS: u32 = 6;

/// Gas estimate reported with mock quotes.
pub const MOCK_GAS_ETH: &str = "0.0002";

/// Slippage percent reported with mock quotes.
pub const MOCK_SLIPPAGE_PERCENT: f64 = 0.5;

/// Slippage fraction applied to the mock minimum output (0.5%).
pub const MOCK_SLIPPAGE_FRACTION: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// Source name attached to mock quotes.
pub const MOCK_SOURCE_NAME: &str = "Mock";

/// Parse a human amount, accepting decimal or scientific notation.
///
/// # Errors
/// `InvalidAmount` unless the value is a finite number greater than zero.
pub fn parse_amount(raw: &str) -> Result<Amount> {
    Amount::parse(raw)
}

/// Builds quotes from the aggregator, falling back to the mock price table.
#[derive(Clone)]
pub struct QuoteBuilder {
    registry: Arc<TokenRegistry>,
    prices: MockPriceTable,
    aggregator: Option<Arc<dyn SwapAggregator>>,
}

impl QuoteBuilder {
    /// Create a builder that only produces mock quotes.
    pub fn new(registry: Arc<TokenRegistry>) -> Self {
        Self { registry, prices: MockPriceTable::default(), aggregator: None }
    }

    /// Create a builder from configuration; live quotes are enabled when an
    /// API key is present.
    pub fn from_config(config: &Config, registry: Arc<TokenRegistry>) -> Result<Self> {
        let builder = Self::new(registry);
        match &config.zeroex_api_key {
            Some(api_key) => {
                let client =
                    ZeroExClient::new(&config.zeroex_api_url, api_key, config.aggregator_timeout)?;
                tracing::info!(url = %config.zeroex_api_url, "Live aggregator quotes enabled");
                Ok(builder.with_aggregator(Arc::new(client)))
            }
            None => {
                tracing::info!("No aggregator API key configured, serving mock quotes");
                Ok(builder)
            }
        }
    }

    pub fn with_aggregator(mut self, aggregator: Arc<dyn SwapAggregator>) -> Self {
        self.aggregator = Some(aggregator);
        self
    }

    pub fn with_prices(mut self, prices: MockPriceTable) -> Self {
        self.prices = prices;
        self
    }

    pub fn registry(&self) -> &Arc<TokenRegistry> {
        &self.registry
    }

    pub fn has_aggregator(&self) -> bool {
        self.aggregator.is_some()
    }

    /// Build a quote for `amount` of `from_symbol` into `to_symbol`.
    ///
    /// Aggregator failures never surface here: they downgrade the result to
    /// [`QuoteOutcome::Mock`]. The only error past symbol resolution is
    /// `NumericOverflow`, when an amount does not fit in a uint256.
    pub async fn build(
        &self,
        from_symbol: &str,
        to_symbol: &str,
        amount: &Amount,
        taker: Option<Address>,
    ) -> Result<QuoteOutcome> {
        let from = self.registry.require_symbol(from_symbol)?;
        let to = self.registry.require_symbol(to_symbol)?;
        let sell_amount = from.to_units(amount)?;

        tracing::debug!(
            from = %from.symbol,
            to = %to.symbol,
            amount = %amount,
            sell_amount = %sell_amount,
            "Building quote"
        );

        if let Some(aggregator) = &self.aggregator {
            let request = AggregatorRequest {
                sell_token: from.address,
                buy_token: to.address,
                sell_amount,
                taker,
            };

            match aggregator.quote(&request).await {
                Ok(live) => match self.live_quote(from, to, amount, sell_amount, live) {
                    Ok(quote) => return Ok(QuoteOutcome::Live(quote)),
                    Err(e) => tracing::warn!(
                        error = %e,
                        "Unusable aggregator quote, falling back to mock"
                    ),
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Aggregator unavailable, falling back to mock")
                }
            }
        }

        self.mock_quote(from, to, amount, sell_amount, taker).map(QuoteOutcome::Mock)
    }

    /// Validate a raw endpoint request and build the quote.
    ///
    /// Checks run in order: required fields, amount, registry, then the
    /// builder itself. Every failure maps onto an endpoint error code.
    pub async fn quote_request(
        &self,
        request: &QuoteRequest,
    ) -> std::result::Result<QuoteOutcome, ApiError> {
        let from = request.from_symbol.as_deref().filter(|s| !s.is_empty());
        let to = request.to_symbol.as_deref().filter(|s| !s.is_empty());
        let (Some(from), Some(to), Some(serde_json::Value::String(raw_amount))) =
            (from, to, request.amount.as_ref())
        else {
            return Err(ApiError::missing_params());
        };

        let amount = parse_amount(raw_amount).map_err(|_| ApiError::invalid_amount())?;

        let wallet = request.wallet_address.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let taker = match wallet {
            Some(raw) => Some(raw.parse::<Address>().map_err(|e| {
                ApiError::from(AppError::InvalidAddress(format!("{}: {}", raw, e)))
            })?),
            None => None,
        };

        self.build(from, to, &amount, taker).await.map_err(ApiError::from)
    }

    /// Quote from the local price table with a synthetic, non-executable payload.
    fn mock_quote(
        &self,
        from: &Token,
        to: &Token,
        amount: &Amount,
        sell_amount: U256,
        taker: Option<Address>,
    ) -> Result<Quote> {
        let price = self.prices.price(&from.symbol, &to.symbol);
        let to_amount = amount.checked_mul(price)?;
        let buy_amount = to.to_units(&to_amount)?;
        let min_buy_amount = min_out(to, &to_amount)?;

        // Zero target and an expired deadline keep the payload inert on-chain.
        let calldata = IUniswapV2Router02::swapExactTokensForTokensCall {
            amountIn: sell_amount,
            amountOutMin: min_buy_amount,
            path: vec![from.address, to.address],
            to: taker.unwrap_or(Address::ZERO),
            deadline: U256::ZERO,
        }
        .abi_encode();

        Ok(Quote {
            price: to_fixed(price, QUOTE_DECIMALS),
            from_amount: amount.to_string(),
            to_amount: to_amount.to_fixed(QUOTE_DECIMALS),
            estimated_gas_eth: MOCK_GAS_ETH.to_string(),
            estimated_slippage_percent: MOCK_SLIPPAGE_PERCENT,
            swap_data: Some(SwapData {
                to: format!("{:?}", Address::ZERO),
                data: format!("0x{}", alloy::hex::encode(calldata)),
                value: "0".to_string(),
            }),
            sell_token_address: Some(format!("{:?}", from.address)),
            buy_token_address: Some(format!("{:?}", to.address)),
            sell_amount_wei: Some(sell_amount.to_string()),
            buy_amount_wei: Some(buy_amount.to_string()),
            min_buy_amount_wei: Some(min_buy_amount.to_string()),
            allowance_target: Some(format!("{:?}", self.registry.spender().address)),
            sources: Some(vec![LiquiditySource {
                name: MOCK_SOURCE_NAME.to_string(),
                proportion: "1".to_string(),
            }]),
            is_mock: Some(true),
        })
    }

    /// Map an aggregator response onto the quote shape.
    ///
    /// Token addresses echoed by the aggregator must resolve to the requested
    /// pair in the registry.
    fn live_quote(
        &self,
        from: &Token,
        to: &Token,
        amount: &Amount,
        sell_amount: U256,
        live: AggregatorQuote,
    ) -> Result<Quote> {
        self.check_echoed_token("sellTokenAddress", live.sell_token_address.as_deref(), from)?;
        self.check_echoed_token("buyTokenAddress", live.buy_token_address.as_deref(), to)?;

        let price = parse_decimal("price", &live.price)?;
        let to_amount = amount.checked_mul(price)?;

        let estimated_gas_eth = match (&live.estimated_gas, &live.gas_price) {
            (Some(gas), Some(gas_price)) => {
                let gas = parse_u256("estimatedGas", gas)?;
                let gas_price = parse_u256("gasPrice", gas_price)?;
                let cost = gas.checked_mul(gas_price).ok_or_else(|| {
                    AppError::NumericOverflow(format!("gas cost {} * {}", gas, gas_price))
                })?;
                format_units(cost, 18)
            }
            _ => MOCK_GAS_ETH.to_string(),
        };

        let estimated_slippage_percent = live
            .estimated_price_impact
            .as_deref()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(MOCK_SLIPPAGE_PERCENT);

        let min_buy_amount = match &live.guaranteed_price {
            Some(guaranteed) => {
                let guaranteed = parse_decimal("guaranteedPrice", guaranteed)?;
                to.to_units(&amount.checked_mul(guaranteed)?)?
            }
            None => min_out(to, &to_amount)?,
        };

        let allowance_target = live
            .allowance_target
            .clone()
            .unwrap_or_else(|| format!("{:?}", self.registry.spender().address));

        Ok(Quote {
            price: to_fixed(price, QUOTE_DECIMALS),
            from_amount: amount.to_string(),
            to_amount: to_amount.to_fixed(QUOTE_DECIMALS),
            estimated_gas_eth,
            estimated_slippage_percent,
            swap_data: Some(SwapData {
                to: live.to,
                data: live.data,
                value: live.value.unwrap_or_else(|| "0".to_string()),
            }),
            sell_token_address: Some(format!("{:?}", from.address)),
            buy_token_address: Some(format!("{:?}", to.address)),
            sell_amount_wei: Some(live.sell_amount.unwrap_or_else(|| sell_amount.to_string())),
            buy_amount_wei: Some(live.buy_amount),
            min_buy_amount_wei: Some(min_buy_amount.to_string()),
            allowance_target: Some(allowance_target),
            sources: Some(live.sources),
            is_mock: None,
        })
    }

    fn check_echoed_token(
        &self,
        field: &str,
        echoed: Option<&str>,
        expected: &Token,
    ) -> Result<()> {
        let Some(raw) = echoed else {
            return Ok(());
        };
        let address = raw
            .parse::<Address>()
            .map_err(|e| AppError::InvalidAddress(format!("{} '{}': {}", field, raw, e)))?;
        match self.registry.lookup_address(address) {
            Some(token) if token.symbol == expected.symbol => Ok(()),
            Some(token) => Err(AppError::Parse(format!(
                "{} is {}, expected {}",
                field, token.symbol, expected.symbol
            ))),
            None => Err(AppError::UnknownToken(format!("{} {}", field, address))),
        }
    }
}

#[async_trait]
impl QuoteSource for QuoteBuilder {
    async fn fetch_quote(&self, request: &QuoteRequest) -> Result<Quote> {
        self.quote_request(request)
            .await
            .map(QuoteOutcome::into_quote)
            .map_err(|e| AppError::QuoteRejected { status: 400, message: e.message })
    }
}

/// Slippage-protected minimum output in `to`'s smallest units.
fn min_out(to: &Token, to_amount: &Amount) -> Result<U256> {
    to.to_units(&to_amount.checked_mul(Decimal::ONE - MOCK_SLIPPAGE_FRACTION)?)
}

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| AppError::Parse(format!("Invalid {} '{}': {}", field, raw, e)))
}

fn parse_u256(field: &str, raw: &str) -> Result<U256> {
    raw.parse::<U256>().map_err(|e| AppError::Parse(format!("Invalid {} '{}': {}", field, raw, e)))
}
