//! Fire-and-forget analytics capture.

use std::time::Duration;

use serde_json::{json, Value};

use crate::{
    config::Config,
    error::{AppError, Result},
};

/// Event names emitted by the swap flow.
pub mod events {
    pub const QUOTE_REQUESTED: &str = "quote_requested";
    pub const QUOTE_RECEIVED: &str = "quote_received";
    pub const APPROVAL_SUBMITTED: &str = "approval_submitted";
    pub const APPROVAL_CONFIRMED: &str = "approval_confirmed";
    pub const SWAP_SUBMITTED: &str = "swap_submitted";
    pub const SWAP_CONFIRMED: &str = "swap_confirmed";
    pub const SWAP_FAILED: &str = "swap_failed";
}

/// Sink for analytics events. Implementations must never block the caller
/// and must swallow their own failures.
pub trait AnalyticsSink: Send + Sync {
    fn capture(&self, event: &str, properties: Value);
}

/// Writes events to the tracing log.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

impl AnalyticsSink for TracingSink {
    fn capture(&self, event: &str, properties: Value) {
        tracing::info!(event = %event, properties = %properties, "analytics event");
    }
}

/// Sends events to a PostHog-compatible `/capture/` endpoint.
#[derive(Clone)]
pub struct PostHogSink {
    client: reqwest::Client,
    capture_url: String,
    api_key: String,
    distinct_id: String,
}

impl PostHogSink {
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(host: &str, api_key: &str, distinct_id: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            capture_url: format!("{}/capture/", host.trim_end_matches('/')),
            api_key: api_key.to_string(),
            distinct_id: distinct_id.to_string(),
        })
    }

    pub fn capture_url(&self) -> &str {
        &self.capture_url
    }

    /// Request body for one event.
    pub fn payload(&self, event: &str, properties: Value) -> Value {
        json!({
            "api_key": self.api_key,
            "event": event,
            "distinct_id": self.distinct_id,
            "properties": properties,
        })
    }
}

impl AnalyticsSink for PostHogSink {
    fn capture(&self, event: &str, properties: Value) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(event = %event, "No runtime, dropping analytics event");
            return;
        };

        let client = self.client.clone();
        let url = self.capture_url.clone();
        let body = self.payload(event, properties);
        let event = event.to_string();

        handle.spawn(async move {
            if let Err(e) = client.post(&url).json(&body).send().await {
                tracing::debug!(event = %event, error = %e, "Analytics capture failed");
            }
        });
    }
}

/// Pick the sink for a configuration: PostHog when a key is set, logs otherwise.
pub fn sink_from_config(config: &Config, distinct_id: &str) -> Result<Box<dyn AnalyticsSink>> {
    match &config.posthog_api_key {
        Some(key) => Ok(Box::new(PostHogSink::new(&config.posthog_host, key, distinct_id)?)),
        None => Ok(Box::new(TracingSink)),
    }
}
