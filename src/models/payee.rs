//! Payee models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A payee record from the ledger.
///
/// Payees with `transfer_acct` set stand for transfers between accounts and
/// are hidden from listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payee {
    pub id: String,
    pub name: String,

    /// Category the ledger suggests for this payee
    #[serde(default)]
    pub category: Option<String>,

    /// Account id on the other side of a transfer
    #[serde(default)]
    pub transfer_acct: Option<String>,
}

impl Payee {
    pub fn is_transfer(&self) -> bool {
        self.transfer_acct.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct PayeeView {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
}

/// Output of the `list_payees` tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PayeeList {
    pub count: usize,
    pub payees: Vec<PayeeView>,
}

/// Output of the `create_payee` tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PayeeReceipt {
    pub id: String,
    pub name: String,
    pub message: String,
}
