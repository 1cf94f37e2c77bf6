//! Date defaults and argument validation.
//!
//! Dates travel as `YYYY-MM-DD` strings and months as `YYYY-MM`, both in the
//! local calendar. Each default has an `*_at` variant taking `now` so tests
//! can pin the clock.

use chrono::{DateTime, Duration, Local, NaiveDate};

use crate::error::AppError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const MONTH_FORMAT: &str = "%Y-%m";

pub fn today() -> String {
    today_at(Local::now())
}

pub fn today_at(now: DateTime<Local>) -> String {
    now.format(DATE_FORMAT).to_string()
}

pub fn current_month() -> String {
    current_month_at(Local::now())
}

pub fn current_month_at(now: DateTime<Local>) -> String {
    now.format(MONTH_FORMAT).to_string()
}

/// Calendar date `n` × 24h before now. Plain elapsed-time subtraction.
pub fn days_ago(n: i64) -> String {
    days_ago_at(Local::now(), n)
}

pub fn days_ago_at(now: DateTime<Local>, n: i64) -> String {
    (now - Duration::hours(24 * n)).format(DATE_FORMAT).to_string()
}

/// First day of the current month.
pub fn month_start() -> String {
    month_start_at(Local::now())
}

pub fn month_start_at(now: DateTime<Local>) -> String {
    format!("{}-01", current_month_at(now))
}

/// Validate a caller-supplied date and return it in canonical form.
pub fn parse_date(field: &str, value: &str) -> Result<String, AppError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map(|date| date.format(DATE_FORMAT).to_string())
        .map_err(|_| {
            AppError::Validation(format!("{field} must be a date in YYYY-MM-DD format, got '{value}'"))
        })
}

/// Validate a caller-supplied month key and return it in canonical form.
pub fn parse_month(field: &str, value: &str) -> Result<String, AppError> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), DATE_FORMAT)
        .map(|date| date.format(MONTH_FORMAT).to_string())
        .map_err(|_| {
            AppError::Validation(format!("{field} must be a month in YYYY-MM format, got '{value}'"))
        })
}

/// Resolve an optional `[start, end]` window.
///
/// A missing end defaults to today, a missing start to `default_start()`.
/// Supplied values are validated; an inverted window is rejected.
pub fn date_window(
    start: Option<&str>,
    end: Option<&str>,
    default_start: impl FnOnce() -> String,
) -> Result<(String, String), AppError> {
    let start = match start {
        Some(value) => parse_date("start_date", value)?,
        None => default_start(),
    };
    let end = match end {
        Some(value) => parse_date("end_date", value)?,
        None => today(),
    };

    if start > end {
        return Err(AppError::Validation(format!(
            "start_date {start} is after end_date {end}"
        )));
    }

    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn march_15() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn defaults_follow_the_clock() {
        let now = march_15();
        assert_eq!(today_at(now), "2024-03-15");
        assert_eq!(current_month_at(now), "2024-03");
        assert_eq!(month_start_at(now), "2024-03-01");
    }

    #[test]
    fn days_ago_crosses_month_and_year_boundaries() {
        let now = march_15();
        assert_eq!(days_ago_at(now, 30), "2024-02-14");
        assert_eq!(days_ago_at(now, 90), "2023-12-16");
        assert_eq!(days_ago_at(now, 0), "2024-03-15");
    }

    #[test]
    fn parse_date_canonicalizes_and_rejects_garbage() {
        assert_eq!(parse_date("date", " 2024-03-01 ").unwrap(), "2024-03-01");
        assert!(parse_date("date", "2024-02-30").is_err());
        assert!(parse_date("date", "03/01/2024").is_err());
    }

    #[test]
    fn parse_month_accepts_year_month_only() {
        assert_eq!(parse_month("month", "2024-03").unwrap(), "2024-03");
        assert!(parse_month("month", "2024-13").is_err());
        assert!(parse_month("month", "2024-03-01").is_err());
    }

    #[test]
    fn date_window_rejects_inverted_range() {
        let err = date_window(Some("2024-03-10"), Some("2024-03-01"), || unreachable!()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn date_window_uses_default_start() {
        let (start, end) = date_window(None, Some("2024-03-31"), || "2024-03-01".to_string()).unwrap();
        assert_eq!(start, "2024-03-01");
        assert_eq!(end, "2024-03-31");
    }
}
