//! Transaction data models and tool response types.
//!
//! This module defines:
//! - `Transaction`: Ledger entity as returned by the data-access layer
//! - `NewTransaction` / `TransactionUpdate`: Write payloads
//! - Response types for the transaction tools

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Represents a transaction record from the ledger.
///
/// # Amount Storage
///
/// Amounts are stored as `i64` minor units. The sign carries the direction:
/// - negative: outflow (expense)
/// - positive: inflow (income)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,

    /// Account the transaction belongs to
    pub account: String,

    /// ISO calendar date (`YYYY-MM-DD`)
    pub date: String,

    pub amount: i64,

    /// Payee id, when the ledger linked one
    #[serde(default)]
    pub payee: Option<String>,

    /// Free-text payee name, used when no payee id is linked
    #[serde(default)]
    pub payee_name: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub cleared: Option<bool>,

    /// External deduplication key
    #[serde(default)]
    pub imported_id: Option<String>,
}

/// Write payload for adding a transaction through an import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub date: String,
    pub amount: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleared: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_id: Option<String>,
}

/// Partial update payload. Only fields that are `Some` reach the ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleared: Option<bool>,
}

impl TransactionUpdate {
    /// Names of the fields this update will change, in payload order.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.amount.is_some() {
            fields.push("amount");
        }
        if self.category.is_some() {
            fields.push("category");
        }
        if self.payee.is_some() {
            fields.push("payee");
        }
        if self.notes.is_some() {
            fields.push("notes");
        }
        if self.date.is_some() {
            fields.push("date");
        }
        if self.cleared.is_some() {
            fields.push("cleared");
        }
        fields
    }
}

/// A transaction with ids resolved to display names and a decimal amount.
///
/// ```json
/// {
///   "id": "tx_9",
///   "date": "2024-03-01",
///   "amount": -35.0,
///   "payee": "Costco",
///   "category": "Groceries",
///   "notes": null,
///   "cleared": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct TransactionView {
    pub id: String,
    pub date: String,
    pub amount: f64,
    pub payee: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub cleared: Option<bool>,
}

/// Output of the `get_transactions` tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct TransactionList {
    pub account: String,
    pub start_date: String,
    pub end_date: String,
    pub count: usize,
    pub transactions: Vec<TransactionView>,
}

/// A search hit, tagged with the display name of its source account.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SearchHit {
    pub id: String,
    pub account: String,
    pub date: String,
    pub amount: f64,
    pub payee: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

/// Output of the `search_transactions` tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct SearchResults {
    pub start_date: String,
    pub end_date: String,
    pub count: usize,
    pub transactions: Vec<SearchHit>,
}

/// Output of the write tools that act on a single transaction.
#[derive(Debug, Serialize, JsonSchema)]
pub struct TransactionReceipt {
    pub id: String,
    pub message: String,
}
