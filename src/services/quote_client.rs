//! Client side of the quote endpoint.

use std::time::Duration;

use async_trait::async_trait;

use crate::{
    error::{ApiError, AppError, Result},
    types::{Quote, QuoteRequest},
};

/// Anything the swap flow can ask for a quote.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quote(&self, request: &QuoteRequest) -> Result<Quote>;
}

/// Calls `POST /api/quote` on a running server.
#[derive(Clone)]
pub struct QuoteApiClient {
    client: reqwest::Client,
    endpoint: String,
}

impl QuoteApiClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, endpoint: format!("{}/api/quote", base_url.trim_end_matches('/')) })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QuoteSource for QuoteApiClient {
    async fn fetch_quote(&self, request: &QuoteRequest) -> Result<Quote> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ApiError>().await {
                Ok(api_error) => api_error.message,
                Err(_) => status.canonical_reason().unwrap_or("unexpected status").to_string(),
            };
            return Err(AppError::QuoteRejected { status: status.as_u16(), message });
        }

        response
            .json::<Quote>()
            .await
            .map_err(|e| AppError::Parse(format!("Failed to parse quote: {}", e)))
    }
}
