//! Conversion between ledger minor units and decimal display values.
//!
//! The ledger stores money as `i64` cents. Tools accept and return decimals
//! (`35.5` means 3550 minor units). Rounding uses `f64::round`, which rounds
//! halfway cases away from zero.

use crate::error::AppError;

const MINOR_PER_UNIT: f64 = 100.0;

/// Largest magnitude accepted from callers, in minor units.
///
/// Every integer up to 2^53 is exact in an `f64`, so conversions inside this
/// range neither saturate nor lose cents.
pub const MAX_MINOR: i64 = (1 << 53) - 1;

/// Decimal display value to minor units, rounded to the nearest cent.
///
/// Rejects NaN, infinities and amounts beyond [`MAX_MINOR`] before they can
/// reach the ledger.
pub fn to_minor(field: &str, amount: f64) -> Result<i64, AppError> {
    if !amount.is_finite() {
        return Err(AppError::Validation(format!("{field} must be a finite number")));
    }

    let minor = (amount * MINOR_PER_UNIT).round();
    if minor.abs() > MAX_MINOR as f64 {
        return Err(AppError::Validation(format!(
            "{field} is out of range: {amount}"
        )));
    }

    Ok(minor as i64)
}

/// Minor units to a decimal display value. No rounding is applied.
pub fn from_minor(amount: i64) -> f64 {
    amount as f64 / MINOR_PER_UNIT
}

/// Render a decimal for messages: `35` for whole amounts, `12.5` otherwise.
pub fn display(amount: f64) -> String {
    format!("{amount}")
}
