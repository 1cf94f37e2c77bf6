//! Transaction tools.
//!
//! - `add_transaction`: account must resolve; category is optional and dropped
//!   if it does not resolve
//! - `get_transactions`: one account, ids resolved to names
//! - `search_transactions`: every open account, filtered and sorted
//! - `update_transaction`: partial update; category is dropped if it does not
//!   resolve, an unknown payee is created
//! - `delete_transaction`: permanent

use schemars::JsonSchema;
use serde::Deserialize;

use crate::{
    error::AppError,
    ledger::LedgerDataAccess,
    models::{
        account::Account,
        transaction::{
            NewTransaction, SearchResults, TransactionList, TransactionReceipt, TransactionUpdate,
            TransactionView,
        },
    },
    services::{
        aggregation::{
            DEFAULT_SEARCH_LIMIT, NameLookup, SearchFilters, fetch_transactions, payee_display,
            search,
        },
        currency::{display, from_minor, to_minor},
        dates::{date_window, days_ago, parse_date, today},
        resolver::{EntityKind, require_resolution, try_resolution},
    },
    tools::{payees::find_or_create_payee, require_text, sync_after_mutation},
};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddTransactionParams {
    /// Account id or name
    pub account: String,

    /// Amount in currency units; negative for expenses, positive for income
    pub amount: f64,

    /// Transaction date (YYYY-MM-DD), defaults to today
    pub date: Option<String>,

    /// Payee name
    pub payee: Option<String>,

    /// Category id or name; ignored if it does not match a category
    pub category: Option<String>,

    pub notes: Option<String>,

    pub cleared: Option<bool>,

    /// External id used by the ledger to skip duplicate imports
    pub imported_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetTransactionsParams {
    /// Account id or name
    pub account: String,

    /// Start date (YYYY-MM-DD), defaults to 30 days ago
    pub start_date: Option<String>,

    /// End date (YYYY-MM-DD), defaults to today
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchTransactionsParams {
    /// Case-insensitive fragment of the payee name
    pub payee: Option<String>,

    /// Case-insensitive fragment of the notes
    pub notes: Option<String>,

    /// Minimum absolute amount in currency units
    pub min_amount: Option<f64>,

    /// Maximum absolute amount in currency units
    pub max_amount: Option<f64>,

    /// Start date (YYYY-MM-DD), defaults to 90 days ago
    pub start_date: Option<String>,

    /// End date (YYYY-MM-DD), defaults to today
    pub end_date: Option<String>,

    /// Maximum number of results (default 50)
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateTransactionParams {
    /// Transaction id
    pub id: String,

    /// New amount in currency units
    pub amount: Option<f64>,

    /// New category id or name; ignored if it does not match a category
    pub category: Option<String>,

    /// New payee id or name; created if no payee matches
    pub payee: Option<String>,

    pub notes: Option<String>,

    /// New date (YYYY-MM-DD)
    pub date: Option<String>,

    pub cleared: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteTransactionParams {
    /// Transaction id
    pub id: String,
}

pub async fn add_transaction(
    ledger: &dyn LedgerDataAccess,
    params: AddTransactionParams,
) -> Result<TransactionReceipt, AppError> {
    let amount = to_minor("amount", params.amount)?;
    let date = match params.date.as_deref() {
        Some(value) => parse_date("date", value)?,
        None => today(),
    };

    let accounts = ledger.list_accounts().await?;
    let account = require_resolution(EntityKind::Account, &accounts, &params.account)?;

    let category = match params.category.as_deref() {
        Some(token) => {
            let categories = ledger.list_categories().await?;
            try_resolution(EntityKind::Category, &categories, token).map(|c| c.id.clone())
        }
        None => None,
    };

    let transaction = NewTransaction {
        date,
        amount,
        payee_name: params.payee,
        category,
        notes: params.notes,
        cleared: params.cleared,
        imported_id: params.imported_id,
    };

    let id = ledger.add_transaction(&account.id, &transaction).await?;
    tracing::info!("Added transaction {} to account {}", id, account.id);
    sync_after_mutation(ledger, format!("Add transaction to {}", account.name)).await?;

    let direction = if amount >= 0 { "income" } else { "expense" };
    Ok(TransactionReceipt {
        message: format!(
            "Added {} {} to {}",
            display(from_minor(amount).abs()),
            direction,
            account.name
        ),
        id,
    })
}

pub async fn get_transactions(
    ledger: &dyn LedgerDataAccess,
    params: GetTransactionsParams,
) -> Result<TransactionList, AppError> {
    let (start, end) = date_window(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        || days_ago(30),
    )?;

    let accounts = ledger.list_accounts().await?;
    let account = require_resolution(EntityKind::Account, &accounts, &params.account)?;

    let (transactions, payees, categories) = tokio::try_join!(
        ledger.list_transactions(&account.id, &start, &end),
        ledger.list_payees(),
        ledger.list_categories(),
    )?;
    let payees = NameLookup::from_named(&payees);
    let categories = NameLookup::from_named(&categories);

    let transactions: Vec<TransactionView> = transactions
        .into_iter()
        .map(|transaction| TransactionView {
            payee: payee_display(&transaction, &payees),
            category: transaction
                .category
                .as_deref()
                .map(|id| categories.name_or_id(id)),
            amount: from_minor(transaction.amount),
            id: transaction.id,
            date: transaction.date,
            notes: transaction.notes,
            cleared: transaction.cleared,
        })
        .collect();

    Ok(TransactionList {
        account: account.name.clone(),
        start_date: start,
        end_date: end,
        count: transactions.len(),
        transactions,
    })
}

pub async fn search_transactions(
    ledger: &dyn LedgerDataAccess,
    params: SearchTransactionsParams,
) -> Result<SearchResults, AppError> {
    let filters = search_filters(&params)?;
    let limit = match params.limit {
        Some(0) => return Err(AppError::Validation("limit must be at least 1".to_string())),
        Some(limit) => limit,
        None => DEFAULT_SEARCH_LIMIT,
    };
    let (start, end) = date_window(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        || days_ago(90),
    )?;

    let accounts = ledger.list_accounts().await?;
    let open: Vec<&Account> = accounts.iter().filter(|a| !a.closed).collect();

    let (candidates, payees, categories) = tokio::try_join!(
        fetch_transactions(ledger, &open, &start, &end),
        ledger.list_payees(),
        ledger.list_categories(),
    )?;

    let hits = search(
        candidates,
        &filters,
        &NameLookup::from_named(&payees),
        &NameLookup::from_named(&categories),
        limit,
    );

    Ok(SearchResults {
        start_date: start,
        end_date: end,
        count: hits.len(),
        transactions: hits,
    })
}

fn search_filters(params: &SearchTransactionsParams) -> Result<SearchFilters, AppError> {
    let bound = |field: &str, value: Option<f64>| -> Result<Option<i64>, AppError> {
        value
            .map(|amount| to_minor(field, amount.abs()))
            .transpose()
    };

    let min_amount = bound("min_amount", params.min_amount)?;
    let max_amount = bound("max_amount", params.max_amount)?;
    if let (Some(min), Some(max)) = (min_amount, max_amount) {
        if min > max {
            return Err(AppError::Validation(
                "min_amount must not exceed max_amount".to_string(),
            ));
        }
    }

    let fragment = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Ok(SearchFilters {
        payee: fragment(&params.payee),
        notes: fragment(&params.notes),
        min_amount,
        max_amount,
    })
}

pub async fn update_transaction(
    ledger: &dyn LedgerDataAccess,
    params: UpdateTransactionParams,
) -> Result<TransactionReceipt, AppError> {
    let id = require_text("id", &params.id)?.to_string();
    let amount = params
        .amount
        .map(|a| to_minor("amount", a))
        .transpose()?;
    let date = params
        .date
        .as_deref()
        .map(|d| parse_date("date", d))
        .transpose()?;

    let mut ignored = None;

    let category = match params.category.as_deref() {
        Some(token) => {
            let categories = ledger.list_categories().await?;
            let found = try_resolution(EntityKind::Category, &categories, token).map(|c| c.id.clone());
            if found.is_none() {
                ignored = Some(token);
            }
            found
        }
        None => None,
    };

    let payee = match params.payee.as_deref() {
        Some(token) => Some(find_or_create_payee(ledger, require_text("payee", token)?).await?),
        None => None,
    };

    let update = TransactionUpdate {
        amount,
        category,
        payee,
        notes: params.notes,
        date,
        cleared: params.cleared,
    };

    ledger.update_transaction(&id, &update).await?;
    tracing::info!("Updated transaction {} ({:?})", id, update.changed_fields());
    sync_after_mutation(ledger, format!("Update transaction {id}")).await?;

    let changed = update.changed_fields();
    let mut message = if changed.is_empty() {
        format!("Updated transaction {id}: no fields changed")
    } else {
        format!("Updated transaction {id}: {}", changed.join(", "))
    };
    if let Some(token) = ignored {
        message.push_str(&format!("; ignored unresolved category '{token}'"));
    }

    Ok(TransactionReceipt { id, message })
}

pub async fn delete_transaction(
    ledger: &dyn LedgerDataAccess,
    params: DeleteTransactionParams,
) -> Result<TransactionReceipt, AppError> {
    let id = require_text("id", &params.id)?.to_string();

    ledger.delete_transaction(&id).await?;
    tracing::info!("Deleted transaction {}", id);
    sync_after_mutation(ledger, format!("Delete transaction {id}")).await?;

    Ok(TransactionReceipt {
        message: format!("Deleted transaction {id}"),
        id,
    })
}
