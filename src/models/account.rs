//! Account data models and tool response types.
//!
//! This module defines:
//! - `Account`: Ledger entity as returned by the data-access layer
//! - `AccountView`: One row of the `list_accounts` tool output
//! - `AccountBalance`: Output of the `get_account_balance` tool

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Represents an account record from the ledger.
///
/// # Balance Storage
///
/// The balance is not part of the record. It is fetched on demand through
/// `LedgerDataAccess::get_account_balance` and is expressed in minor units
/// (cents), never floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Stable identifier; the only reliable resolution key
    pub id: String,

    /// Display name, not guaranteed to be unique
    pub name: String,

    /// Excluded from envelope-budgeting totals when true
    #[serde(default)]
    pub offbudget: bool,

    /// Closed accounts are skipped by search and spending aggregation
    #[serde(default)]
    pub closed: bool,
}

impl Account {
    /// True when the account takes part in budget totals and is still open.
    pub fn is_budgeted(&self) -> bool {
        !self.closed && !self.offbudget
    }
}

/// One account in the `list_accounts` output.
///
/// ```json
/// {
///   "id": "acc_1",
///   "name": "Checking",
///   "balance": 1250.75,
///   "offbudget": false,
///   "closed": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct AccountView {
    pub id: String,
    pub name: String,

    /// Current balance as a decimal display value
    pub balance: f64,

    pub offbudget: bool,
    pub closed: bool,
}

/// Output of the `list_accounts` tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct AccountList {
    pub accounts: Vec<AccountView>,
}

/// Output of the `get_account_balance` tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct AccountBalance {
    pub account_id: String,

    /// Resolved display name of the account
    pub account: String,

    pub balance: f64,
}
