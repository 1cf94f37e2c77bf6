//! Account tools: `list_accounts`, `get_account_balance`.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::{
    error::AppError,
    ledger::LedgerDataAccess,
    models::account::{AccountBalance, AccountList, AccountView},
    services::{
        aggregation::fetch_balances,
        currency::from_minor,
        resolver::{EntityKind, require_resolution},
    },
};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AccountParams {
    /// Account id or name (case-insensitive)
    pub account: String,
}

/// Every account with its balance. Balances are fetched concurrently.
pub async fn list_accounts(ledger: &dyn LedgerDataAccess) -> Result<AccountList, AppError> {
    let accounts = ledger.list_accounts().await?;
    let with_balances = fetch_balances(ledger, accounts).await?;

    let accounts = with_balances
        .into_iter()
        .map(|(account, balance)| AccountView {
            id: account.id,
            name: account.name,
            balance: from_minor(balance),
            offbudget: account.offbudget,
            closed: account.closed,
        })
        .collect();

    Ok(AccountList { accounts })
}

pub async fn get_account_balance(
    ledger: &dyn LedgerDataAccess,
    params: AccountParams,
) -> Result<AccountBalance, AppError> {
    let accounts = ledger.list_accounts().await?;
    let account = require_resolution(EntityKind::Account, &accounts, &params.account)?;

    let balance = ledger.get_account_balance(&account.id).await?;

    Ok(AccountBalance {
        account_id: account.id.clone(),
        account: account.name.clone(),
        balance: from_minor(balance),
    })
}
