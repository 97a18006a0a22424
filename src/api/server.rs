//! Router assembly and the server loop.

use std::sync::Arc;

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    api::handlers::{self, AppState},
    config::Config,
    error::{AppError, Result},
    services::{QuoteBuilder, TokenRegistry},
};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    // Any origin, for local development.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/api/quote", post(handlers::quote))
        .route("/api/tokens", get(handlers::tokens))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Bind `config.bind_addr` and serve until the process exits.
pub async fn serve(config: &Config) -> Result<()> {
    let registry = Arc::new(TokenRegistry::sepolia());
    let builder = QuoteBuilder::from_config(config, registry)?;
    let app = router(AppState::new(builder));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", config.bind_addr, e)))?;

    tracing::info!(addr = %config.bind_addr, "Listening");
    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Transport(format!("Server error: {}", e)))
}
