//! HTTP middleware components.

/// Bearer-token authentication for `/mcp`
pub mod auth;
