//! In-memory ledger used by handler tests.
//!
//! Holds a small household budget and records every write and sync so tests
//! can assert on side effects.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LedgerDataAccess, LedgerError};
use crate::models::{
    account::Account,
    budget::{BudgetMonth, CategoryBudget, GroupBudget},
    category::{Category, CategoryGroup},
    payee::Payee,
    schedule::{
        EndCondition, Frequency, NewSchedule, Recurrence, Schedule, ScheduleAmount, ScheduleDate,
    },
    transaction::{NewTransaction, Transaction, TransactionUpdate},
};

#[derive(Debug, Default, Clone)]
pub struct LedgerState {
    pub accounts: Vec<Account>,
    pub balances: HashMap<String, i64>,
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
    pub payees: Vec<Payee>,
    pub months: HashMap<String, BudgetMonth>,
    pub schedules: Vec<Schedule>,

    pub added: Vec<(String, NewTransaction)>,
    pub updates: Vec<(String, TransactionUpdate)>,
    pub deleted: Vec<String>,
    pub budget_writes: Vec<(String, String, i64)>,
    pub created_payees: Vec<String>,
    pub created_schedules: Vec<NewSchedule>,
    pub deleted_schedules: Vec<String>,
    pub syncs: usize,

    pub fail_sync: bool,
    pub fail_reads: bool,
    next_id: usize,
}

impl LedgerState {
    pub fn write_count(&self) -> usize {
        self.added.len()
            + self.updates.len()
            + self.deleted.len()
            + self.budget_writes.len()
            + self.created_payees.len()
            + self.created_schedules.len()
            + self.deleted_schedules.len()
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_new{}", self.next_id)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new(state: LedgerState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// A household budget with four accounts and a month of activity.
    pub fn household() -> Self {
        Self::new(household_state())
    }

    pub fn snapshot(&self) -> LedgerState {
        self.state.lock().unwrap().clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut LedgerState)) {
        f(&mut self.state.lock().unwrap());
    }

    fn read<T>(&self, f: impl FnOnce(&LedgerState) -> T) -> Result<T, LedgerError> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(LedgerError::Rejected {
                status: 503,
                message: "ledger offline".to_string(),
            });
        }
        Ok(f(&state))
    }

    fn write<T>(&self, f: impl FnOnce(&mut LedgerState) -> T) -> Result<T, LedgerError> {
        Ok(f(&mut self.state.lock().unwrap()))
    }
}

fn account(id: &str, name: &str, offbudget: bool, closed: bool) -> Account {
    Account {
        id: id.to_string(),
        name: name.to_string(),
        offbudget,
        closed,
    }
}

fn category(id: &str, name: &str, group_id: &str, is_income: bool) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        group_id: group_id.to_string(),
        is_income,
    }
}

fn group(id: &str, name: &str, is_income: bool) -> CategoryGroup {
    CategoryGroup {
        id: id.to_string(),
        name: name.to_string(),
        is_income,
    }
}

fn payee(id: &str, name: &str, transfer_acct: Option<&str>) -> Payee {
    Payee {
        id: id.to_string(),
        name: name.to_string(),
        category: None,
        transfer_acct: transfer_acct.map(str::to_string),
    }
}

pub fn transaction(
    id: &str,
    account: &str,
    date: &str,
    amount: i64,
    payee: Option<&str>,
    category: Option<&str>,
    notes: Option<&str>,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        account: account.to_string(),
        date: date.to_string(),
        amount,
        payee: payee.map(str::to_string),
        payee_name: None,
        category: category.map(str::to_string),
        notes: notes.map(str::to_string),
        cleared: Some(true),
        imported_id: None,
    }
}

fn category_budget(id: &str, name: &str, budgeted: i64, spent: i64, carryover: bool) -> CategoryBudget {
    CategoryBudget {
        id: id.to_string(),
        name: name.to_string(),
        budgeted,
        spent,
        balance: budgeted + spent,
        carryover,
    }
}

pub fn household_state() -> LedgerState {
    let mut transactions = vec![
        transaction("tx_1", "acc_1", "2024-03-02", -4500, Some("p_costco"), Some("cat_groc"), Some("weekly shop")),
        transaction("tx_2", "acc_1", "2024-03-05", -1250, Some("p_cafe"), Some("cat_dine"), Some("Lunch with Sam")),
        transaction("tx_3", "acc_1", "2024-03-01", 250000, Some("p_acme"), Some("cat_salary"), Some("march pay")),
        transaction("tx_4", "acc_2", "2024-03-10", -9900, Some("p_costco"), Some("cat_groc"), Some("bulk run")),
        transaction("tx_5", "acc_3", "2024-03-03", -700, Some("p_cafe"), Some("cat_dine"), None),
        transaction("tx_6", "acc_4", "2024-03-04", -3000, None, None, Some("broker fee")),
        transaction("tx_7", "acc_2", "2024-02-20", -2000, None, None, None),
    ];
    transactions[6].payee_name = Some("Street Market".to_string());

    let month = BudgetMonth {
        month: "2024-03".to_string(),
        to_budget: 12000,
        total_budgeted: 140000,
        category_groups: vec![
            GroupBudget {
                id: "grp_everyday".to_string(),
                name: "Everyday".to_string(),
                is_income: false,
                budgeted: 1400,
                // Deliberately inconsistent with the categories below
                spent: -999,
                balance: 600,
                categories: vec![
                    category_budget("cat_groc", "Groceries", 1000, -500, false),
                    category_budget("cat_dine", "Dining Out", 400, -300, true),
                ],
            },
            GroupBudget {
                id: "grp_income".to_string(),
                name: "Income".to_string(),
                is_income: true,
                budgeted: 0,
                spent: 0,
                balance: 0,
                categories: vec![category_budget("cat_salary", "Salary", 0, 0, false)],
            },
        ],
    };

    LedgerState {
        accounts: vec![
            account("acc_1", "Checking", false, false),
            account("acc_2", "Savings", false, false),
            account("acc_3", "Old Card", false, true),
            account("acc_4", "Brokerage", true, false),
        ],
        balances: HashMap::from([
            ("acc_1".to_string(), 123456),
            ("acc_2".to_string(), 500000),
            ("acc_3".to_string(), 0),
            ("acc_4".to_string(), -2050),
        ]),
        transactions,
        categories: vec![
            category("cat_groc", "Groceries", "grp_everyday", false),
            category("cat_dine", "Dining Out", "grp_everyday", false),
            category("cat_salary", "Salary", "grp_income", true),
        ],
        payees: vec![
            payee("p_costco", "Costco", None),
            payee("p_cafe", "Corner Cafe", None),
            payee("p_acme", "Acme Corp", None),
            payee("p_landlord", "Landlord", None),
            payee("p_transfer", "Transfer: Savings", Some("acc_2")),
        ],
        months: HashMap::from([("2024-03".to_string(), month)]),
        schedules: vec![
            Schedule {
                id: "sch_rent".to_string(),
                name: Some("Rent".to_string()),
                next_date: Some("2024-04-01".to_string()),
                completed: false,
                posts_transaction: true,
                payee: Some("p_landlord".to_string()),
                account: Some("acc_1".to_string()),
                amount: Some(ScheduleAmount::Single(-150000)),
                amount_op: Some("is".to_string()),
                date: Some(ScheduleDate::Recurring(Recurrence {
                    frequency: Frequency::Monthly,
                    interval: 1,
                    start: "2024-01-01".to_string(),
                    end: EndCondition::Never,
                })),
            },
            Schedule {
                id: "sch_gym".to_string(),
                name: Some("Gym".to_string()),
                next_date: Some("2024-03-15".to_string()),
                completed: false,
                posts_transaction: false,
                payee: None,
                account: Some("acc_2".to_string()),
                amount: Some(ScheduleAmount::Range {
                    num1: -4000,
                    num2: -4500,
                }),
                amount_op: Some("isbetween".to_string()),
                date: Some(ScheduleDate::Recurring(Recurrence {
                    frequency: Frequency::Weekly,
                    interval: 2,
                    start: "2024-01-05".to_string(),
                    end: EndCondition::AfterOccurrences(20),
                })),
            },
            Schedule {
                id: "sch_tax".to_string(),
                name: None,
                next_date: Some("2024-04-15".to_string()),
                completed: false,
                posts_transaction: false,
                payee: Some("p_gone".to_string()),
                account: None,
                amount: None,
                amount_op: None,
                date: Some(ScheduleDate::Once("2024-04-15".to_string())),
            },
        ],
        ..LedgerState::default()
    }
}

#[async_trait]
impl LedgerDataAccess for InMemoryLedger {
    async fn list_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        self.read(|s| s.accounts.clone())
    }

    async fn get_account_balance(&self, account_id: &str) -> Result<i64, LedgerError> {
        self.read(|s| s.balances.get(account_id).copied().unwrap_or_default())
    }

    async fn list_transactions(
        &self,
        account_id: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.read(|s| {
            s.transactions
                .iter()
                .filter(|t| t.account == account_id)
                .filter(|t| t.date.as_str() >= start && t.date.as_str() <= end)
                .cloned()
                .collect()
        })
    }

    async fn add_transaction(
        &self,
        account_id: &str,
        transaction: &NewTransaction,
    ) -> Result<String, LedgerError> {
        self.write(|s| {
            let id = s.next_id("tx");
            s.added.push((account_id.to_string(), transaction.clone()));
            s.transactions.push(Transaction {
                id: id.clone(),
                account: account_id.to_string(),
                date: transaction.date.clone(),
                amount: transaction.amount,
                payee: None,
                payee_name: transaction.payee_name.clone(),
                category: transaction.category.clone(),
                notes: transaction.notes.clone(),
                cleared: transaction.cleared,
                imported_id: transaction.imported_id.clone(),
            });
            id
        })
    }

    async fn update_transaction(
        &self,
        transaction_id: &str,
        update: &TransactionUpdate,
    ) -> Result<(), LedgerError> {
        self.write(|s| {
            s.updates.push((transaction_id.to_string(), update.clone()));
        })
    }

    async fn delete_transaction(&self, transaction_id: &str) -> Result<(), LedgerError> {
        self.write(|s| {
            s.transactions.retain(|t| t.id != transaction_id);
            s.deleted.push(transaction_id.to_string());
        })
    }

    async fn list_categories(&self) -> Result<Vec<Category>, LedgerError> {
        self.read(|s| s.categories.clone())
    }

    async fn list_category_groups(&self) -> Result<Vec<CategoryGroup>, LedgerError> {
        self.read(|_| {
            vec![
                group("grp_everyday", "Everyday", false),
                group("grp_income", "Income", true),
                group("grp_someday", "Someday", false),
            ]
        })
    }

    async fn list_payees(&self) -> Result<Vec<Payee>, LedgerError> {
        self.read(|s| s.payees.clone())
    }

    async fn create_payee(&self, name: &str) -> Result<String, LedgerError> {
        self.write(|s| {
            let id = s.next_id("p");
            s.created_payees.push(name.to_string());
            s.payees.push(payee(&id, name, None));
            id
        })
    }

    async fn get_budget_month(&self, month: &str) -> Result<BudgetMonth, LedgerError> {
        self.read(|s| s.months.get(month).cloned())?
            .ok_or_else(|| LedgerError::Rejected {
                status: 404,
                message: format!("no budget for {month}"),
            })
    }

    async fn set_budget_amount(
        &self,
        month: &str,
        category_id: &str,
        amount: i64,
    ) -> Result<(), LedgerError> {
        self.write(|s| {
            s.budget_writes
                .push((month.to_string(), category_id.to_string(), amount));
        })
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>, LedgerError> {
        self.read(|s| s.schedules.clone())
    }

    async fn create_schedule(&self, schedule: &NewSchedule) -> Result<String, LedgerError> {
        self.write(|s| {
            s.created_schedules.push(schedule.clone());
            s.next_id("sch")
        })
    }

    async fn delete_schedule(&self, schedule_id: &str) -> Result<(), LedgerError> {
        self.write(|s| {
            s.schedules.retain(|sch| sch.id != schedule_id);
            s.deleted_schedules.push(schedule_id.to_string());
        })
    }

    async fn synchronize(&self) -> Result<(), LedgerError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_sync {
            return Err(LedgerError::Rejected {
                status: 502,
                message: "sync server unreachable".to_string(),
            });
        }
        state.syncs += 1;
        Ok(())
    }

    async fn ping(&self) -> Result<(), LedgerError> {
        self.read(|_| ())
    }
}
