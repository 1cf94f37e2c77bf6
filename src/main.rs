//! Ledger Tool Server - Main Application Entry Point
//!
//! Exposes a personal-finance ledger (accounts, transactions, categories,
//! budgets, payees, recurring schedules) to a conversational agent as a set
//! of named tools over JSON-RPC.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Ledger**: remote service reached over HTTP with reqwest
//! - **Authentication**: optional bearer token compared by SHA-256 digest
//! - **Format**: JSON-RPC 2.0 requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Connect to the ledger service and check it answers
//! 3. Build HTTP router with routes and middleware
//! 4. Start server on configured port

mod app;
mod config;
mod error;
mod handlers;
mod ledger;
mod middleware;
mod models;
mod services;
mod tools;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{app::AppState, ledger::http::HttpLedgerClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG, defaulting to "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded: {:?}", config);

    let ledger = HttpLedgerClient::connect(&config).await?;

    let auth_token = config.auth_token();
    if auth_token.is_none() {
        tracing::warn!("MCP_AUTH_TOKEN is not set; /mcp accepts unauthenticated requests");
    }
    let state = AppState::new(Arc::new(ledger), auth_token);
    let app = app::router(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
