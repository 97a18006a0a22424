//! HTTP API module.
//!
//! Serves the quote endpoint and the read-only registry routes.

pub mod handlers;
pub mod server;

pub use handlers::{AppState, HealthResponse, TokensResponse};
pub use server::{router, serve};
