//! Tool dispatch layer.
//!
//! Each tool is a named operation the agent can invoke. A call goes through
//! the same steps:
//!
//! 1. Deserialize and validate the arguments into the tool's params type
//! 2. Resolve id-or-name references
//! 3. Fill in default dates
//! 4. Call the ledger, aggregating where the tool is a query
//! 5. Normalize money to decimals
//! 6. Return the structured payload together with its text rendering
//!
//! Mutating tools sync the ledger before reporting success.

pub mod accounts;
pub mod budgets;
pub mod categories;
pub mod payees;
pub mod schedules;
pub mod sync;
pub mod transactions;

use schemars::{JsonSchema, r#gen::SchemaSettings};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{error::AppError, ledger::LedgerDataAccess};

/// Result of a successful tool call.
///
/// `text` is always the pretty-printed form of `structured`, so the two
/// renderings cannot disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub structured: Value,
    pub text: String,
}

impl ToolOutput {
    pub fn from_payload<T: Serialize>(payload: &T) -> Result<Self, AppError> {
        let structured = serde_json::to_value(payload)?;
        let text = serde_json::to_string_pretty(&structured)?;
        Ok(Self { structured, text })
    }
}

/// Static description of a tool, as advertised by `tools/list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    pub output_schema: Value,
    pub annotations: ToolAnnotations,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    pub read_only_hint: bool,
    pub destructive_hint: bool,
}

/// Arguments of tools that take none.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct NoParams {}

/// Inline JSON schema for a type, without `$ref` indirection.
fn schema_for<T: JsonSchema>() -> Value {
    let generator = SchemaSettings::draft07()
        .with(|settings| {
            settings.inline_subschemas = true;
            settings.meta_schema = None;
        })
        .into_generator();

    serde_json::to_value(generator.into_root_schema_for::<T>()).unwrap_or(Value::Null)
}

fn define<P: JsonSchema, O: JsonSchema>(
    name: &'static str,
    title: &'static str,
    description: &'static str,
    access: Access,
) -> ToolDefinition {
    ToolDefinition {
        name,
        title,
        description,
        input_schema: schema_for::<P>(),
        output_schema: schema_for::<O>(),
        annotations: ToolAnnotations {
            read_only_hint: matches!(access, Access::Read),
            destructive_hint: matches!(access, Access::Destructive),
        },
    }
}

enum Access {
    Read,
    Write,
    Destructive,
}

/// Every tool this server exposes, in listing order.
pub fn definitions() -> Vec<ToolDefinition> {
    use crate::models::{account, budget, category, payee, schedule, transaction};

    vec![
        define::<NoParams, account::AccountList>(
            "list_accounts",
            "List accounts",
            "List all accounts with their current balance, off-budget and closed flags.",
            Access::Read,
        ),
        define::<accounts::AccountParams, account::AccountBalance>(
            "get_account_balance",
            "Get account balance",
            "Get the current balance of one account, given its id or name.",
            Access::Read,
        ),
        define::<transactions::AddTransactionParams, transaction::TransactionReceipt>(
            "add_transaction",
            "Add transaction",
            "Add a transaction to an account. Negative amounts are expenses, positive amounts \
             are income. Date defaults to today.",
            Access::Write,
        ),
        define::<transactions::GetTransactionsParams, transaction::TransactionList>(
            "get_transactions",
            "Get transactions",
            "List the transactions of one account in a date range (default: last 30 days).",
            Access::Read,
        ),
        define::<transactions::SearchTransactionsParams, transaction::SearchResults>(
            "search_transactions",
            "Search transactions",
            "Search transactions across all open accounts by payee, notes and amount \
             (default window: last 90 days). Newest first.",
            Access::Read,
        ),
        define::<transactions::UpdateTransactionParams, transaction::TransactionReceipt>(
            "update_transaction",
            "Update transaction",
            "Change selected fields of a transaction. Fields that are not supplied keep \
             their value.",
            Access::Write,
        ),
        define::<transactions::DeleteTransactionParams, transaction::TransactionReceipt>(
            "delete_transaction",
            "Delete transaction",
            "Permanently delete a transaction by id.",
            Access::Destructive,
        ),
        define::<NoParams, category::CategoryTree>(
            "list_categories",
            "List categories",
            "List category groups with their categories and income flag.",
            Access::Read,
        ),
        define::<budgets::BudgetMonthParams, budget::BudgetMonthView>(
            "get_budget_month",
            "Get budget month",
            "Budgeted, spent and balance per category for a month (default: current month).",
            Access::Read,
        ),
        define::<budgets::SetBudgetParams, budget::BudgetReceipt>(
            "set_budget_amount",
            "Set budget amount",
            "Set the budgeted amount of a category for a month (default: current month).",
            Access::Write,
        ),
        define::<payees::ListPayeesParams, payee::PayeeList>(
            "list_payees",
            "List payees",
            "List payees, optionally filtered by a name fragment. Transfer payees are hidden.",
            Access::Read,
        ),
        define::<payees::CreatePayeeParams, payee::PayeeReceipt>(
            "create_payee",
            "Create payee",
            "Create a new payee.",
            Access::Write,
        ),
        define::<budgets::SpendingSummaryParams, budget::SpendingSummary>(
            "get_spending_summary",
            "Get spending summary",
            "Spending by category, total income and net across on-budget accounts \
             (default: this month to date).",
            Access::Read,
        ),
        define::<NoParams, schedule::ScheduleList>(
            "list_schedules",
            "List schedules",
            "List recurring schedules with amount, frequency, payee and account.",
            Access::Read,
        ),
        define::<schedules::CreateScheduleParams, schedule::ScheduleReceipt>(
            "create_schedule",
            "Create schedule",
            "Create a recurring schedule. Unknown payees are created.",
            Access::Write,
        ),
        define::<schedules::DeleteScheduleParams, schedule::ScheduleReceipt>(
            "delete_schedule",
            "Delete schedule",
            "Permanently delete a schedule by id.",
            Access::Destructive,
        ),
        define::<NoParams, sync::SyncReceipt>(
            "sync",
            "Sync",
            "Synchronize the ledger with its server.",
            Access::Write,
        ),
    ]
}

/// Run a tool by name.
pub async fn call_tool(
    ledger: &dyn LedgerDataAccess,
    name: &str,
    arguments: Option<Value>,
) -> Result<ToolOutput, AppError> {
    match name {
        "list_accounts" => {
            let _: NoParams = parse_args(arguments)?;
            render(accounts::list_accounts(ledger).await)
        }
        "get_account_balance" => {
            render(accounts::get_account_balance(ledger, parse_args(arguments)?).await)
        }
        "add_transaction" => {
            render(transactions::add_transaction(ledger, parse_args(arguments)?).await)
        }
        "get_transactions" => {
            render(transactions::get_transactions(ledger, parse_args(arguments)?).await)
        }
        "search_transactions" => {
            render(transactions::search_transactions(ledger, parse_args(arguments)?).await)
        }
        "update_transaction" => {
            render(transactions::update_transaction(ledger, parse_args(arguments)?).await)
        }
        "delete_transaction" => {
            render(transactions::delete_transaction(ledger, parse_args(arguments)?).await)
        }
        "list_categories" => {
            let _: NoParams = parse_args(arguments)?;
            render(categories::list_categories(ledger).await)
        }
        "get_budget_month" => {
            render(budgets::get_budget_month(ledger, parse_args(arguments)?).await)
        }
        "set_budget_amount" => {
            render(budgets::set_budget_amount(ledger, parse_args(arguments)?).await)
        }
        "list_payees" => render(payees::list_payees(ledger, parse_args(arguments)?).await),
        "create_payee" => render(payees::create_payee(ledger, parse_args(arguments)?).await),
        "get_spending_summary" => {
            render(budgets::get_spending_summary(ledger, parse_args(arguments)?).await)
        }
        "list_schedules" => {
            let _: NoParams = parse_args(arguments)?;
            render(schedules::list_schedules(ledger).await)
        }
        "create_schedule" => {
            render(schedules::create_schedule(ledger, parse_args(arguments)?).await)
        }
        "delete_schedule" => {
            render(schedules::delete_schedule(ledger, parse_args(arguments)?).await)
        }
        "sync" => {
            let _: NoParams = parse_args(arguments)?;
            render(sync::sync(ledger).await)
        }
        other => Err(AppError::UnknownTool(other.to_string())),
    }
}

fn render<T: Serialize>(result: Result<T, AppError>) -> Result<ToolOutput, AppError> {
    ToolOutput::from_payload(&result?)
}

/// Deserialize tool arguments. Missing or `null` arguments read as `{}`.
pub fn parse_args<P: DeserializeOwned>(arguments: Option<Value>) -> Result<P, AppError> {
    let arguments = match arguments {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(value) => value,
    };

    serde_json::from_value(arguments).map_err(|e| AppError::Validation(e.to_string()))
}

/// Reject empty or whitespace-only strings for required text fields.
pub fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}

/// Sync after a write. A failure here means the write already happened.
pub async fn sync_after_mutation(
    ledger: &dyn LedgerDataAccess,
    operation: impl Into<String>,
) -> Result<(), AppError> {
    ledger.synchronize().await.map_err(|source| {
        let operation = operation.into();
        tracing::error!("Sync failed after '{}': {}", operation, source);
        AppError::PostMutationSync { operation, source }
    })
}
