//! Schedule models: recurring rules that anticipate future transactions.
//!
//! The ledger encodes two fields dynamically: `amount` is either a plain
//! integer or a `{num1, num2}` range, and `date` is either a single date or a
//! recurrence descriptor. Both are typed variants here.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        };
        f.write_str(name)
    }
}

/// Schedule amount in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScheduleAmount {
    Single(i64),

    /// Approximate match between two endpoints
    Range { num1: i64, num2: i64 },
}

impl ScheduleAmount {
    /// The amount shown in simplified views. Ranges surface their first endpoint.
    pub fn display_minor(&self) -> i64 {
        match *self {
            ScheduleAmount::Single(amount) => amount,
            ScheduleAmount::Range { num1, .. } => num1,
        }
    }
}

/// When a recurrence stops producing occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndCondition {
    Never,
    AfterOccurrences(u32),
    OnDate(String),
}

/// Recurrence descriptor with every field required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecurrenceWire", into = "RecurrenceWire")]
pub struct Recurrence {
    pub frequency: Frequency,
    pub interval: u32,

    /// First occurrence, `YYYY-MM-DD`
    pub start: String,

    pub end: EndCondition,
}

/// Ledger encoding of a recurrence: end condition spread over three fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecurrenceWire {
    frequency: Frequency,

    #[serde(default)]
    interval: Option<u32>,

    start: String,

    #[serde(default)]
    end_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_occurrences: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_date: Option<String>,
}

impl TryFrom<RecurrenceWire> for Recurrence {
    type Error = String;

    fn try_from(wire: RecurrenceWire) -> Result<Self, Self::Error> {
        let end = match wire.end_mode.as_deref().unwrap_or("never") {
            "never" => EndCondition::Never,
            "after_n_occurrences" => EndCondition::AfterOccurrences(
                wire.end_occurrences
                    .ok_or("endOccurrences is required for after_n_occurrences")?,
            ),
            "on_date" => EndCondition::OnDate(
                wire.end_date.ok_or("endDate is required for on_date")?,
            ),
            other => return Err(format!("unknown endMode: {other}")),
        };

        Ok(Self {
            frequency: wire.frequency,
            interval: wire.interval.unwrap_or(1).max(1),
            start: wire.start,
            end,
        })
    }
}

impl From<Recurrence> for RecurrenceWire {
    fn from(recurrence: Recurrence) -> Self {
        let (end_mode, end_occurrences, end_date) = match recurrence.end {
            EndCondition::Never => ("never", None, None),
            EndCondition::AfterOccurrences(n) => ("after_n_occurrences", Some(n), None),
            EndCondition::OnDate(date) => ("on_date", None, Some(date)),
        };

        Self {
            frequency: recurrence.frequency,
            interval: Some(recurrence.interval),
            start: recurrence.start,
            end_mode: Some(end_mode.to_string()),
            end_occurrences,
            end_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScheduleDate {
    Recurring(Recurrence),
    Once(String),
}

/// A schedule record from the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub next_date: Option<String>,

    #[serde(default)]
    pub completed: bool,

    /// Whether the ledger posts the transaction automatically
    #[serde(default)]
    pub posts_transaction: bool,

    #[serde(default)]
    pub payee: Option<String>,

    #[serde(default)]
    pub account: Option<String>,

    #[serde(default)]
    pub amount: Option<ScheduleAmount>,

    #[serde(default)]
    pub amount_op: Option<String>,

    #[serde(default)]
    pub date: Option<ScheduleDate>,
}

/// Write payload for a new schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSchedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub posts_transaction: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee: Option<String>,

    pub account: String,
    pub amount: i64,
    pub amount_op: String,
    pub date: Recurrence,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ScheduleView {
    pub id: String,
    pub name: Option<String>,
    pub next_date: Option<String>,
    pub amount: Option<f64>,

    /// How the amount is matched: `is`, `isapprox` or `isbetween`
    pub amount_op: Option<String>,

    /// e.g. `"monthly"` or `"every 2 weekly"`
    pub frequency: Option<String>,

    pub payee: Option<String>,
    pub account: Option<String>,
    pub completed: bool,
    pub posts_transaction: bool,
}

/// Output of the `list_schedules` tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ScheduleList {
    pub count: usize,
    pub schedules: Vec<ScheduleView>,
}

/// Output of the schedule write tools.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ScheduleReceipt {
    pub id: String,
    pub message: String,
}
