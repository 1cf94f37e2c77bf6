//! Cross-entity aggregation over freshly fetched ledger data.
//!
//! This service handles:
//! - Fan-out fetches across accounts (issued concurrently, joined before use)
//! - Transaction search: filter, sort by date descending, limit
//! - Spending summary grouped by category
//! - Budget-month rollup with absolute spend
//!
//! The pure functions take already-fetched data so they can be tested without
//! a ledger. Money stays in minor units until the final view is built.

use std::collections::HashMap;

use futures::future::try_join_all;

use crate::{
    ledger::{LedgerDataAccess, LedgerError},
    models::{
        account::Account,
        budget::{
            BudgetMonth, BudgetMonthView, CategoryBudgetView, CategorySpending, GroupBudgetView,
            SpendingSummary,
        },
        transaction::{SearchHit, Transaction},
    },
    services::{currency::from_minor, resolver::Named},
};

pub const DEFAULT_SEARCH_LIMIT: usize = 50;
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Id → display name map built from a full entity fetch.
#[derive(Debug, Default, Clone)]
pub struct NameLookup {
    names: HashMap<String, String>,
}

impl NameLookup {
    pub fn from_named<T: Named>(items: &[T]) -> Self {
        Self {
            names: items
                .iter()
                .map(|item| (item.id().to_string(), item.name().to_string()))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Display name for an id, falling back to the id itself.
    pub fn name_or_id(&self, id: &str) -> String {
        self.get(id).unwrap_or(id).to_string()
    }
}

/// Display name of a transaction's payee: linked payee first, then free text.
pub fn payee_display(transaction: &Transaction, payees: &NameLookup) -> Option<String> {
    match &transaction.payee {
        Some(id) => Some(payees.name_or_id(id)),
        None => transaction.payee_name.clone(),
    }
}

/// A transaction tagged with the account it was fetched from.
#[derive(Debug, Clone)]
pub struct Tagged<'a> {
    pub account: &'a Account,
    pub transaction: Transaction,
}

/// Fetch the window's transactions for every given account.
///
/// One request per account, all in flight at once. Any failure fails the whole
/// fetch; partial results are dropped.
pub async fn fetch_transactions<'a>(
    ledger: &dyn LedgerDataAccess,
    accounts: &[&'a Account],
    start: &str,
    end: &str,
) -> Result<Vec<Tagged<'a>>, LedgerError> {
    let fetches = accounts.iter().map(|&account| async move {
        let transactions = ledger.list_transactions(&account.id, start, end).await?;
        Ok::<_, LedgerError>(
            transactions
                .into_iter()
                .map(|transaction| Tagged {
                    account,
                    transaction,
                })
                .collect::<Vec<_>>(),
        )
    });

    Ok(try_join_all(fetches).await?.into_iter().flatten().collect())
}

/// Fetch every account's balance concurrently, paired with the account.
pub async fn fetch_balances(
    ledger: &dyn LedgerDataAccess,
    accounts: Vec<Account>,
) -> Result<Vec<(Account, i64)>, LedgerError> {
    let balances =
        try_join_all(accounts.iter().map(|account| ledger.get_account_balance(&account.id)))
            .await?;

    Ok(accounts.into_iter().zip(balances).collect())
}

/// Optional, AND-combined search filters. Amount bounds are absolute minor units.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub payee: Option<String>,
    pub notes: Option<String>,
    pub min_amount: Option<i64>,
    pub max_amount: Option<i64>,
}

impl SearchFilters {
    fn matches(&self, transaction: &Transaction, payee: Option<&str>) -> bool {
        if let Some(wanted) = &self.payee {
            let found = payee.is_some_and(|name| contains_ignore_case(name, wanted));
            if !found {
                return false;
            }
        }

        if let Some(wanted) = &self.notes {
            let found = transaction
                .notes
                .as_deref()
                .is_some_and(|notes| contains_ignore_case(notes, wanted));
            if !found {
                return false;
            }
        }

        let magnitude = transaction.amount.abs();
        if self.min_amount.is_some_and(|min| magnitude < min) {
            return false;
        }
        if self.max_amount.is_some_and(|max| magnitude > max) {
            return false;
        }

        true
    }
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Filter, sort newest first and truncate search candidates.
///
/// ISO dates sort correctly as strings; the sort is stable so same-day
/// transactions keep their fetch order.
pub fn search(
    candidates: Vec<Tagged<'_>>,
    filters: &SearchFilters,
    payees: &NameLookup,
    categories: &NameLookup,
    limit: usize,
) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = candidates
        .into_iter()
        .filter_map(|Tagged { account, transaction }| {
            let payee = payee_display(&transaction, payees);
            if !filters.matches(&transaction, payee.as_deref()) {
                return None;
            }

            Some(SearchHit {
                account: account.name.clone(),
                category: transaction
                    .category
                    .as_deref()
                    .map(|id| categories.name_or_id(id)),
                amount: from_minor(transaction.amount),
                id: transaction.id,
                date: transaction.date,
                payee,
                notes: transaction.notes,
            })
        })
        .collect();

    hits.sort_by(|a, b| b.date.cmp(&a.date));
    hits.truncate(limit);
    hits
}

/// Group outflows by category and total inflows.
///
/// Negative amounts are spending, bucketed by category id. Transactions with
/// no category go to "Uncategorized"; an id with no matching category is
/// shown as the id. Everything else counts as income. Each line's percentage
/// is rounded on its own, so the column need not sum to exactly 100.
pub fn summarize_spending<'t>(
    transactions: impl IntoIterator<Item = &'t Transaction>,
    categories: &NameLookup,
    start: &str,
    end: &str,
) -> SpendingSummary {
    let mut by_category: HashMap<Option<&'t str>, i64> = HashMap::new();
    let mut total_spent: i64 = 0;
    let mut total_income: i64 = 0;

    for transaction in transactions {
        if transaction.amount < 0 {
            let spent = transaction.amount.saturating_abs();
            let entry = by_category.entry(transaction.category.as_deref()).or_default();
            *entry = entry.saturating_add(spent);
            total_spent = total_spent.saturating_add(spent);
        } else {
            total_income = total_income.saturating_add(transaction.amount);
        }
    }

    let mut lines: Vec<(String, i64)> = by_category
        .into_iter()
        .map(|(id, amount)| {
            let name = match id {
                Some(id) => categories.name_or_id(id),
                None => UNCATEGORIZED.to_string(),
            };
            (name, amount)
        })
        .collect();
    lines.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let categories = lines
        .into_iter()
        .map(|(category, amount)| CategorySpending {
            percentage: percentage_of(amount, total_spent),
            amount: from_minor(amount),
            category,
        })
        .collect();

    SpendingSummary {
        start_date: start.to_string(),
        end_date: end.to_string(),
        total_spent: from_minor(total_spent),
        total_income: from_minor(total_income),
        net: from_minor(total_income.saturating_sub(total_spent)),
        categories,
    }
}

/// `round(part / total * 100)`, or 0 when nothing was spent.
pub fn percentage_of(part: i64, total: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as i64
}

/// Recompute spend as absolute values and normalize every amount.
///
/// A group's spent total is the sum of its categories' absolute spend; the
/// group-level figure from the ledger is ignored. Balances keep their sign.
pub fn rollup_budget_month(month: BudgetMonth) -> BudgetMonthView {
    let mut total_spent: i64 = 0;

    let groups = month
        .category_groups
        .into_iter()
        .map(|group| {
            let group_spent: i64 = group.categories.iter().map(|c| c.spent.abs()).sum();
            total_spent += group_spent;

            GroupBudgetView {
                id: group.id,
                name: group.name,
                is_income: group.is_income,
                budgeted: from_minor(group.budgeted),
                spent: from_minor(group_spent),
                balance: from_minor(group.balance),
                categories: group
                    .categories
                    .into_iter()
                    .map(|category| CategoryBudgetView {
                        id: category.id,
                        name: category.name,
                        budgeted: from_minor(category.budgeted),
                        spent: from_minor(category.spent.abs()),
                        balance: from_minor(category.balance),
                        carryover: category.carryover,
                    })
                    .collect(),
            }
        })
        .collect();

    BudgetMonthView {
        month: month.month,
        to_budget: from_minor(month.to_budget),
        total_budgeted: from_minor(month.total_budgeted),
        total_spent: from_minor(total_spent),
        groups,
    }
}
