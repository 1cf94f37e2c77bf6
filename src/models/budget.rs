//! Budget-month models and spending-summary response types.
//!
//! This module defines:
//! - `BudgetMonth`: Raw month snapshot from the ledger (signed minor units)
//! - `BudgetMonthView`: Rolled-up month with absolute spend and decimals
//! - `SpendingSummary`: Output of the spending aggregation

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Raw budget snapshot for one month.
///
/// `spent` values arrive signed (expenses negative).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetMonth {
    /// Month key, `YYYY-MM`
    pub month: String,

    #[serde(default)]
    pub to_budget: i64,

    #[serde(default)]
    pub total_budgeted: i64,

    #[serde(default)]
    pub category_groups: Vec<GroupBudget>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupBudget {
    pub id: String,
    pub name: String,

    /// Sent snake_case like the category models
    #[serde(default, rename = "is_income", alias = "isIncome")]
    pub is_income: bool,

    #[serde(default)]
    pub budgeted: i64,

    /// Group total as reported by the ledger; the rollup recomputes it
    #[serde(default)]
    pub spent: i64,

    #[serde(default)]
    pub balance: i64,

    #[serde(default)]
    pub categories: Vec<CategoryBudget>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBudget {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub budgeted: i64,

    #[serde(default)]
    pub spent: i64,

    #[serde(default)]
    pub balance: i64,

    #[serde(default)]
    pub carryover: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CategoryBudgetView {
    pub id: String,
    pub name: String,
    pub budgeted: f64,

    /// Always non-negative
    pub spent: f64,

    /// Signed, as reported by the ledger
    pub balance: f64,

    pub carryover: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct GroupBudgetView {
    pub id: String,
    pub name: String,
    pub is_income: bool,
    pub budgeted: f64,

    /// Sum of absolute category spend
    pub spent: f64,

    pub balance: f64,
    pub categories: Vec<CategoryBudgetView>,
}

/// Output of the `get_budget_month` tool.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct BudgetMonthView {
    pub month: String,
    pub to_budget: f64,
    pub total_budgeted: f64,
    pub total_spent: f64,
    pub groups: Vec<GroupBudgetView>,
}

/// Output of the `set_budget_amount` tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct BudgetReceipt {
    pub month: String,
    pub category_id: String,
    pub category: String,
    pub amount: f64,
    pub message: String,
}

/// One category line of a spending summary.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CategorySpending {
    pub category: String,
    pub amount: f64,

    /// Whole percent of total spent, rounded per line
    pub percentage: i64,
}

/// Output of the `get_spending_summary` tool.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SpendingSummary {
    pub start_date: String,
    pub end_date: String,
    pub total_spent: f64,
    pub total_income: f64,
    pub net: f64,
    pub categories: Vec<CategorySpending>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_income_flag_reads_the_snake_case_key() {
        let group: GroupBudget =
            serde_json::from_str(r#"{"id":"g","name":"Income","is_income":true}"#).unwrap();

        assert!(group.is_income);
        assert!(group.categories.is_empty());
    }

    #[test]
    fn month_snapshot_decodes_camel_case_totals() {
        let month: BudgetMonth = serde_json::from_str(
            r#"{"month":"2024-03","toBudget":12000,"totalBudgeted":140000,
                "categoryGroups":[{"id":"g","name":"Income","is_income":true,"budgeted":0}]}"#,
        )
        .unwrap();

        assert_eq!(month.to_budget, 12000);
        assert_eq!(month.total_budgeted, 140000);
        assert!(month.category_groups[0].is_income);
    }
}
