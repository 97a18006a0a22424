//! Integration tests for the HTTP quote endpoint.
//!
//! Run with: `cargo test --test test_quote_endpoint`

mod common;

use std::{sync::Arc, time::Duration};

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};

use sepolia_swap_demo::{
    services::{aggregator::QUOTE_PATH, QuoteApiClient, QuoteSource, ZeroExClient},
    types::QuoteRequest,
    AppError, QuoteBuilder,
};

async fn post(base: &str, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(format!("{}/api/quote", base))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

fn weth_to_dai(amount: &str) -> Value {
    json!({"fromSymbol": "WETH", "toSymbol": "DAI", "amount": amount})
}

/// Quote builder backed by a stand-in aggregator serving `app`.
async fn builder_with_aggregator(app: Router, timeout: Duration) -> QuoteBuilder {
    let url = common::spawn_aggregator(app).await;
    let aggregator = ZeroExClient::new(&url, "key", timeout).unwrap();
    common::mock_builder().with_aggregator(Arc::new(aggregator))
}

#[tokio::test]
async fn test_weth_to_dai_quote() {
    let base = common::spawn_server(common::mock_builder()).await;
    let (status, body) = post(&base, weth_to_dai("1")).await;

    assert_eq!(status, 200);
    assert_eq!(body["price"], "2000.000000");
    assert_eq!(body["fromAmount"], "1");
    assert_eq!(body["toAmount"], "2000.000000");
    assert_eq!(body["estimatedGasEth"], "0.0002");
    assert_eq!(body["estimatedSlippagePercent"], 0.5);
    assert_eq!(body["isMock"], true);
    assert_eq!(body["swapData"]["to"], "0x0000000000000000000000000000000000000000");
    assert_eq!(body["sources"][0]["name"], "Mock");
}

#[tokio::test]
async fn test_missing_from_symbol() {
    let base = common::spawn_server(common::mock_builder()).await;
    let (status, body) = post(&base, json!({"toSymbol": "DAI", "amount": "1"})).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "MISSING_PARAMS");
}

#[tokio::test]
async fn test_numeric_amount_is_missing_params() {
    let base = common::spawn_server(common::mock_builder()).await;
    let (status, body) =
        post(&base, json!({"fromSymbol": "WETH", "toSymbol": "DAI", "amount": 1})).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "MISSING_PARAMS");
}

#[tokio::test]
async fn test_malformed_body_is_missing_params() {
    let base = common::spawn_server(common::mock_builder()).await;
    let response = reqwest::Client::new()
        .post(format!("{}/api/quote", base))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "MISSING_PARAMS");
}

#[tokio::test]
async fn test_json_body_without_content_type() {
    let base = common::spawn_server(common::mock_builder()).await;
    let response = reqwest::Client::new()
        .post(format!("{}/api/quote", base))
        .body(weth_to_dai("1").to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["toAmount"], "2000.000000");
}

#[tokio::test]
async fn test_json_body_with_text_content_type() {
    let base = common::spawn_server(common::mock_builder()).await;
    let response = reqwest::Client::new()
        .post(format!("{}/api/quote", base))
        .header(reqwest::header::CONTENT_TYPE, "text/plain")
        .body(weth_to_dai("1").to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_invalid_amounts() {
    let base = common::spawn_server(common::mock_builder()).await;
    for amount in ["-1", "abc", "1e400"] {
        let (status, body) = post(&base, weth_to_dai(amount)).await;
        assert_eq!(status, 400, "amount {amount}");
        assert_eq!(body["error"], "INVALID_AMOUNT");
        assert_eq!(body["message"], "Amount must be a positive number.");
    }
}

#[tokio::test]
async fn test_amounts_outside_decimal_range_are_quoted() {
    let base = common::spawn_server(common::mock_builder()).await;
    for amount in ["1e30", "1e-30", "1e-29", "7.9e28"] {
        let (status, body) = post(&base, weth_to_dai(amount)).await;
        assert_eq!(status, 200, "amount {amount}");
        assert_eq!(body["isMock"], true);
    }

    let (_, body) = post(&base, weth_to_dai("1e-30")).await;
    assert_eq!(body["toAmount"], "0.000000");
}

#[tokio::test]
async fn test_amount_overflowing_uint256_is_quote_error() {
    let base = common::spawn_server(common::mock_builder()).await;
    let (status, body) = post(&base, weth_to_dai("1e300")).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "QUOTE_ERROR");
}

#[tokio::test]
async fn test_unknown_token() {
    let base = common::spawn_server(common::mock_builder()).await;
    let (status, body) =
        post(&base, json!({"fromSymbol": "PEPE", "toSymbol": "DAI", "amount": "1"})).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "UNKNOWN_TOKEN");
}

#[tokio::test]
async fn test_known_unlisted_pair_prices_at_one() {
    let base = common::spawn_server(common::mock_builder()).await;
    let (status, body) =
        post(&base, json!({"fromSymbol": "DAI", "toSymbol": "USDC", "amount": "3"})).await;

    assert_eq!(status, 200);
    assert_eq!(body["price"], "1.000000");
    assert_eq!(body["toAmount"], "3.000000");
}

#[tokio::test]
async fn test_aggregator_transport_failure_falls_back_to_mock() {
    let aggregator =
        ZeroExClient::new("http://127.0.0.1:1", "key", Duration::from_secs(2)).unwrap();
    let builder = common::mock_builder().with_aggregator(Arc::new(aggregator));
    let base = common::spawn_server(builder).await;

    let (status, body) = post(&base, weth_to_dai("1")).await;

    assert_eq!(status, 200);
    assert_eq!(body["isMock"], true);
    assert_eq!(body["toAmount"], "2000.000000");
}

#[tokio::test]
async fn test_slow_aggregator_times_out_to_mock() {
    let app = Router::new().route(
        QUOTE_PATH,
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(live_aggregator_body())
        }),
    );
    let builder = builder_with_aggregator(app, Duration::from_secs(1)).await;
    let base = common::spawn_server(builder).await;

    let started = std::time::Instant::now();
    let (status, body) = post(&base, weth_to_dai("1")).await;

    assert_eq!(status, 200);
    assert_eq!(body["isMock"], true);
    assert_eq!(body["toAmount"], "2000.000000");
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_aggregator_server_error_falls_back_to_mock() {
    let app = Router::new()
        .route(QUOTE_PATH, get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream down") }));
    let builder = builder_with_aggregator(app, Duration::from_secs(5)).await;
    let base = common::spawn_server(builder).await;

    let (status, body) = post(&base, weth_to_dai("1")).await;

    assert_eq!(status, 200);
    assert_eq!(body["isMock"], true);
}

#[tokio::test]
async fn test_live_aggregator_quote_is_served() {
    let app = Router::new().route(QUOTE_PATH, get(|| async { Json(live_aggregator_body()) }));
    let builder = builder_with_aggregator(app, Duration::from_secs(5)).await;
    let base = common::spawn_server(builder).await;

    let (status, body) = post(&base, weth_to_dai("1")).await;

    assert_eq!(status, 200);
    assert!(body.get("isMock").is_none());
    assert_eq!(body["price"], "1999.500000");
    assert_eq!(body["swapData"]["to"], "0xdef1c0ded9bec7f1a1670819833240f027b25eff");
}

fn live_aggregator_body() -> Value {
    json!({
        "price": "1999.5",
        "guaranteedPrice": "1989.5",
        "buyAmount": "1999500000000000000000",
        "sellAmount": "1000000000000000000",
        "to": "0xdef1c0ded9bec7f1a1670819833240f027b25eff",
        "data": "0xd9627aa4",
        "value": "0",
        "sellTokenAddress": "0x7b79995e5f793a07bc00c21412e50ecae098e7f9",
        "buyTokenAddress": "0xff34b3d4aee8ddcd6f9afffb6fe49bd371b8a357",
        "sources": [{"name": "Uniswap_V3", "proportion": "1"}]
    })
}

#[tokio::test]
async fn test_tokens_and_health_routes() {
    let base = common::spawn_server(common::mock_builder()).await;
    let client = reqwest::Client::new();

    let tokens: Value =
        client.get(format!("{}/api/tokens", base)).send().await.unwrap().json().await.unwrap();
    assert_eq!(tokens["chainId"], 11155111);
    let symbols: Vec<&str> =
        tokens["tokens"].as_array().unwrap().iter().filter_map(|t| t["symbol"].as_str()).collect();
    assert_eq!(symbols, vec!["DAI", "WETH", "USDC"]);

    let health: Value =
        client.get(format!("{}/health", base)).send().await.unwrap().json().await.unwrap();
    assert_eq!(health["status"], "ok");
}

#[tokio::test]
async fn test_quote_api_client_round_trip() {
    let base = common::spawn_server(common::mock_builder()).await;
    let client = QuoteApiClient::new(&base, Duration::from_secs(5)).unwrap();

    let quote = client.fetch_quote(&QuoteRequest::new("DAI", "WETH", "0.5")).await.unwrap();
    assert_eq!(quote.to_amount, "0.000250");
    assert!(quote.is_mock());

    let err = client.fetch_quote(&QuoteRequest::new("DAI", "WETH", "abc")).await.unwrap_err();
    match err {
        AppError::QuoteRejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Amount must be a positive number.");
        }
        other => panic!("Expected QuoteRejected, got {other:?}"),
    }
}
