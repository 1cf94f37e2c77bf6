//! HTTP request handlers.

/// Liveness check
pub mod health;
/// JSON-RPC tool protocol endpoint
pub mod mcp;
