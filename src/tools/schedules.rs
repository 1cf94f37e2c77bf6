//! Schedule tools: `list_schedules`, `create_schedule`, `delete_schedule`.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::{
    error::AppError,
    ledger::LedgerDataAccess,
    models::schedule::{
        EndCondition, Frequency, NewSchedule, Recurrence, ScheduleDate, ScheduleList,
        ScheduleReceipt, ScheduleView,
    },
    services::{
        aggregation::NameLookup,
        currency::{from_minor, to_minor},
        dates::{parse_date, today},
        resolver::{EntityKind, require_resolution},
    },
    tools::{payees::find_or_create_payee, require_text, sync_after_mutation},
};

/// Every schedule posts the exact amount; approximate ranges are read-only.
const AMOUNT_OP: &str = "is";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EndMode {
    Never,
    AfterNOccurrences,
    OnDate,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateScheduleParams {
    /// Schedule name
    pub name: Option<String>,

    /// Account id or name
    pub account: String,

    /// Payee name; created if no payee has this name
    pub payee: Option<String>,

    /// Amount in currency units; negative for expenses
    pub amount: f64,

    pub frequency: Frequency,

    /// Repeat every N periods (default 1)
    pub interval: Option<u32>,

    /// First occurrence (YYYY-MM-DD), defaults to today
    pub start_date: Option<String>,

    /// When the schedule stops (default never)
    pub end_mode: Option<EndMode>,

    /// Number of occurrences, required with `after_n_occurrences`
    pub end_occurrences: Option<u32>,

    /// Last date (YYYY-MM-DD), required with `on_date`
    pub end_date: Option<String>,

    /// Post the transaction automatically when due (default false)
    pub posts_transaction: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteScheduleParams {
    /// Schedule id
    pub id: String,
}

fn frequency_label(date: &ScheduleDate) -> String {
    match date {
        ScheduleDate::Recurring(r) if r.interval > 1 => format!("every {} {}", r.interval, r.frequency),
        ScheduleDate::Recurring(r) => r.frequency.to_string(),
        ScheduleDate::Once(_) => "once".to_string(),
    }
}

pub async fn list_schedules(ledger: &dyn LedgerDataAccess) -> Result<ScheduleList, AppError> {
    let (schedules, payees, accounts) = tokio::try_join!(
        ledger.list_schedules(),
        ledger.list_payees(),
        ledger.list_accounts(),
    )?;
    let payees = NameLookup::from_named(&payees);
    let accounts = NameLookup::from_named(&accounts);

    let schedules: Vec<ScheduleView> = schedules
        .into_iter()
        .map(|schedule| ScheduleView {
            amount: schedule.amount.map(|a| from_minor(a.display_minor())),
            amount_op: schedule.amount_op,
            frequency: schedule.date.as_ref().map(frequency_label),
            payee: schedule.payee.as_deref().map(|id| payees.name_or_id(id)),
            account: schedule.account.as_deref().map(|id| accounts.name_or_id(id)),
            id: schedule.id,
            name: schedule.name,
            next_date: schedule.next_date,
            completed: schedule.completed,
            posts_transaction: schedule.posts_transaction,
        })
        .collect();

    Ok(ScheduleList {
        count: schedules.len(),
        schedules,
    })
}

/// Validate the recurrence arguments into a complete descriptor.
fn recurrence(params: &CreateScheduleParams) -> Result<Recurrence, AppError> {
    let interval = params.interval.unwrap_or(1);
    if interval == 0 {
        return Err(AppError::Validation("interval must be at least 1".to_string()));
    }

    let start = match params.start_date.as_deref() {
        Some(value) => parse_date("start_date", value)?,
        None => today(),
    };

    let end = match params.end_mode.unwrap_or(EndMode::Never) {
        EndMode::Never => EndCondition::Never,
        EndMode::AfterNOccurrences => match params.end_occurrences {
            Some(n) if n > 0 => EndCondition::AfterOccurrences(n),
            _ => {
                return Err(AppError::Validation(
                    "end_occurrences must be at least 1 when end_mode is after_n_occurrences"
                        .to_string(),
                ));
            }
        },
        EndMode::OnDate => {
            let value = params.end_date.as_deref().ok_or_else(|| {
                AppError::Validation("end_date is required when end_mode is on_date".to_string())
            })?;
            let end_date = parse_date("end_date", value)?;
            if end_date < start {
                return Err(AppError::Validation(format!(
                    "end_date {end_date} is before start_date {start}"
                )));
            }
            EndCondition::OnDate(end_date)
        }
    };

    Ok(Recurrence {
        frequency: params.frequency,
        interval,
        start,
        end,
    })
}

pub async fn create_schedule(
    ledger: &dyn LedgerDataAccess,
    params: CreateScheduleParams,
) -> Result<ScheduleReceipt, AppError> {
    let amount = to_minor("amount", params.amount)?;
    let date = recurrence(&params)?;
    let payee_name = params
        .payee
        .as_deref()
        .map(|p| require_text("payee", p))
        .transpose()?;

    let accounts = ledger.list_accounts().await?;
    let account = require_resolution(EntityKind::Account, &accounts, &params.account)?;

    let payee = match payee_name {
        Some(name) => Some(find_or_create_payee(ledger, name).await?),
        None => None,
    };

    let schedule = NewSchedule {
        name: params.name.clone(),
        posts_transaction: params.posts_transaction.unwrap_or(false),
        payee,
        account: account.id.clone(),
        amount,
        amount_op: AMOUNT_OP.to_string(),
        date,
    };

    let id = ledger.create_schedule(&schedule).await?;
    tracing::info!("Created schedule {} on account {}", id, account.id);
    sync_after_mutation(ledger, format!("Create schedule {id}")).await?;

    let label = params.name.as_deref().unwrap_or(&id);
    Ok(ScheduleReceipt {
        message: format!(
            "Created {} schedule {} on {}",
            frequency_label(&ScheduleDate::Recurring(schedule.date)),
            label,
            account.name
        ),
        id,
    })
}

pub async fn delete_schedule(
    ledger: &dyn LedgerDataAccess,
    params: DeleteScheduleParams,
) -> Result<ScheduleReceipt, AppError> {
    let id = require_text("id", &params.id)?.to_string();

    ledger.delete_schedule(&id).await?;
    tracing::info!("Deleted schedule {}", id);
    sync_after_mutation(ledger, format!("Delete schedule {id}")).await?;

    Ok(ScheduleReceipt {
        message: format!("Deleted schedule {id}"),
        id,
    })
}
