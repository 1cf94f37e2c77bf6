//! Ledger data access.
//!
//! The ledger itself (storage, sync engine, on-disk cache) lives in another
//! service. This module defines the narrow operation set the tools depend on
//! and the production client that reaches it over HTTP.
//!
//! The client is built once at startup by [`http::HttpLedgerClient::connect`]
//! and shared between requests as `Arc<dyn LedgerDataAccess>`. Nothing here
//! locks or queues calls; ordering between concurrent tool calls is whatever
//! the backing service gives us.

pub mod http;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;

use crate::models::{
    account::Account,
    budget::BudgetMonth,
    category::{Category, CategoryGroup},
    payee::Payee,
    schedule::{NewSchedule, Schedule},
    transaction::{NewTransaction, Transaction, TransactionUpdate},
};

/// Failure reported by the data-access layer.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Network or protocol failure talking to the ledger service.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The ledger service answered with a non-success status.
    #[error("ledger rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The ledger answered successfully but the payload was not usable.
    #[error("unexpected ledger response: {0}")]
    UnexpectedResponse(String),

    #[error("invalid ledger server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Operations the tool layer composes. Every call may suspend on I/O.
///
/// Amounts are minor-unit integers; dates are `YYYY-MM-DD` strings and months
/// are `YYYY-MM`.
#[async_trait]
pub trait LedgerDataAccess: Send + Sync {
    async fn list_accounts(&self) -> Result<Vec<Account>, LedgerError>;

    async fn get_account_balance(&self, account_id: &str) -> Result<i64, LedgerError>;

    /// Transactions of one account with `start <= date <= end`.
    async fn list_transactions(
        &self,
        account_id: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<Transaction>, LedgerError>;

    /// Imports one transaction into an account and returns its new id.
    async fn add_transaction(
        &self,
        account_id: &str,
        transaction: &NewTransaction,
    ) -> Result<String, LedgerError>;

    async fn update_transaction(
        &self,
        transaction_id: &str,
        update: &TransactionUpdate,
    ) -> Result<(), LedgerError>;

    async fn delete_transaction(&self, transaction_id: &str) -> Result<(), LedgerError>;

    async fn list_categories(&self) -> Result<Vec<Category>, LedgerError>;

    async fn list_category_groups(&self) -> Result<Vec<CategoryGroup>, LedgerError>;

    async fn list_payees(&self) -> Result<Vec<Payee>, LedgerError>;

    async fn create_payee(&self, name: &str) -> Result<String, LedgerError>;

    async fn get_budget_month(&self, month: &str) -> Result<BudgetMonth, LedgerError>;

    async fn set_budget_amount(
        &self,
        month: &str,
        category_id: &str,
        amount: i64,
    ) -> Result<(), LedgerError>;

    async fn list_schedules(&self) -> Result<Vec<Schedule>, LedgerError>;

    async fn create_schedule(&self, schedule: &NewSchedule) -> Result<String, LedgerError>;

    async fn delete_schedule(&self, schedule_id: &str) -> Result<(), LedgerError>;

    /// Publishes local changes to the backing store.
    async fn synchronize(&self) -> Result<(), LedgerError>;

    /// Liveness check used by the health endpoint.
    async fn ping(&self) -> Result<(), LedgerError>;
}
