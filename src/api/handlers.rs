//! HTTP request handlers.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;

use crate::{
    error::ApiError,
    services::{QuoteBuilder, TokenRegistry},
    types::{Quote, QuoteRequest, SpenderConfig, Token},
};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub builder: Arc<QuoteBuilder>,
    pub registry: Arc<TokenRegistry>,
}

impl AppState {
    pub fn new(builder: QuoteBuilder) -> Self {
        let registry = Arc::clone(builder.registry());
        Self { builder: Arc::new(builder), registry }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensResponse {
    pub chain_id: u64,
    pub tokens: Vec<Token>,
    pub spender: SpenderConfig,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// POST /api/quote - Build a price quote.
///
/// The body is read as JSON whatever its `Content-Type`. A body that is not
/// valid JSON is reported as missing parameters.
pub async fn quote(State(state): State<AppState>, body: Bytes) -> Result<Json<Quote>, ApiError> {
    let request: QuoteRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected quote body");
        ApiError::missing_params()
    })?;

    tracing::info!(
        from = ?request.from_symbol,
        to = ?request.to_symbol,
        amount = ?request.amount,
        "Quote requested"
    );

    match state.builder.quote_request(&request).await {
        Ok(outcome) => {
            tracing::info!(
                is_mock = outcome.is_mock(),
                to_amount = %outcome.quote().to_amount,
                "Quote served"
            );
            Ok(Json(outcome.into_quote()))
        }
        Err(e) => {
            tracing::info!(error = ?e.error, message = %e.message, "Quote rejected");
            Err(e)
        }
    }
}

/// GET /api/tokens - Registry tokens and the default spender.
pub async fn tokens(State(state): State<AppState>) -> Json<TokensResponse> {
    Json(TokensResponse {
        chain_id: state.registry.chain_id(),
        tokens: state.registry.tokens().to_vec(),
        spender: state.registry.spender().clone(),
    })
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
