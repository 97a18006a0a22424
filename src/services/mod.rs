//! Business logic services module.

pub mod aggregator;
pub mod analytics;
pub mod price;
pub mod quote;
pub mod quote_client;
pub mod swap_flow;
pub mod token_registry;

pub use aggregator::{AggregatorQuote, AggregatorRequest, SwapAggregator, ZeroExClient};
pub use analytics::{sink_from_config, AnalyticsSink, PostHogSink, TracingSink};
pub use price::MockPriceTable;
pub use quote::{parse_amount, QuoteBuilder};
pub use quote_client::{QuoteApiClient, QuoteSource};
pub use swap_flow::{AllowanceState, ApprovalAmount, SwapFlow, SwapState};
pub use token_registry::TokenRegistry;
