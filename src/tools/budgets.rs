//! Budget tools: month snapshot, budget assignment and spending summary.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::{
    error::AppError,
    ledger::LedgerDataAccess,
    models::{
        account::Account,
        budget::{BudgetMonthView, BudgetReceipt, SpendingSummary},
    },
    services::{
        aggregation::{NameLookup, fetch_transactions, rollup_budget_month, summarize_spending},
        currency::{display, from_minor, to_minor},
        dates::{current_month, date_window, month_start, parse_month},
        resolver::{EntityKind, require_resolution},
    },
    tools::sync_after_mutation,
};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BudgetMonthParams {
    /// Month (YYYY-MM), defaults to the current month
    pub month: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetBudgetParams {
    /// Category id or name
    pub category: String,

    /// Budgeted amount in currency units
    pub amount: f64,

    /// Month (YYYY-MM), defaults to the current month
    pub month: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SpendingSummaryParams {
    /// Start date (YYYY-MM-DD), defaults to the first day of this month
    pub start_date: Option<String>,

    /// End date (YYYY-MM-DD), defaults to today
    pub end_date: Option<String>,
}

fn month_or_current(month: Option<&str>) -> Result<String, AppError> {
    match month {
        Some(value) => parse_month("month", value),
        None => Ok(current_month()),
    }
}

pub async fn get_budget_month(
    ledger: &dyn LedgerDataAccess,
    params: BudgetMonthParams,
) -> Result<BudgetMonthView, AppError> {
    let month = month_or_current(params.month.as_deref())?;
    let snapshot = ledger.get_budget_month(&month).await?;
    Ok(rollup_budget_month(snapshot))
}

/// Assign a budget amount. The category must resolve before anything is written.
pub async fn set_budget_amount(
    ledger: &dyn LedgerDataAccess,
    params: SetBudgetParams,
) -> Result<BudgetReceipt, AppError> {
    let amount = to_minor("amount", params.amount)?;
    let month = month_or_current(params.month.as_deref())?;

    let categories = ledger.list_categories().await?;
    let category = require_resolution(EntityKind::Category, &categories, &params.category)?;

    ledger
        .set_budget_amount(&month, &category.id, amount)
        .await?;
    tracing::info!("Budgeted {} to {} for {}", amount, category.id, month);
    sync_after_mutation(ledger, format!("Set budget for {} in {}", category.name, month)).await?;

    Ok(BudgetReceipt {
        message: format!(
            "Set {} budget for {} to {}",
            category.name,
            month,
            display(from_minor(amount))
        ),
        month,
        category_id: category.id.clone(),
        category: category.name.clone(),
        amount: from_minor(amount),
    })
}

/// Spending by category over open, on-budget accounts.
pub async fn get_spending_summary(
    ledger: &dyn LedgerDataAccess,
    params: SpendingSummaryParams,
) -> Result<SpendingSummary, AppError> {
    let (start, end) = date_window(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        month_start,
    )?;

    let accounts = ledger.list_accounts().await?;
    let budgeted: Vec<&Account> = accounts.iter().filter(|a| a.is_budgeted()).collect();

    let (tagged, categories) = tokio::try_join!(
        fetch_transactions(ledger, &budgeted, &start, &end),
        ledger.list_categories(),
    )?;

    Ok(summarize_spending(
        tagged.iter().map(|t| &t.transaction),
        &NameLookup::from_named(&categories),
        &start,
        &end,
    ))
}
