//! Data models for ledger entities, tool outputs and the protocol envelope.
//!
//! Ledger entities carry minor-unit integers exactly as the data-access layer
//! returns them. The `*View` types are what tools hand back to the caller,
//! with ids resolved to names and money normalized to decimals.

/// Accounts and balances
pub mod account;
/// Budget months and spending summaries
pub mod budget;
/// Categories and category groups
pub mod category;
/// JSON-RPC envelope
pub mod jsonrpc;
/// Payees
pub mod payee;
/// Recurring schedules
pub mod schedule;
/// Transactions
pub mod transaction;
