//! Time-to-live handling.

use chrono::{DateTime, Days, Utc};
use serde_json::Value;

use crate::error::{Result, SealError};

/// TTL applied when the caller gives none.
pub const DEFAULT_TTL_DAYS: i64 = 7;

/// Interpret a loosely-typed TTL value from a JSON request body.
///
/// Follows the `expiryDays || 7` rule existing clients rely on: any finite
/// non-zero number counts; everything else (absent, `null`, `false`, `0`,
/// strings, arrays, objects, `true`) falls back to seven days.
///
/// Fractions resolve the way adding them to a day of the month does: the
/// fractional part is dropped from the resulting day, so positive values round
/// down toward zero (`0.5` is zero days) and negative values round down away
/// from zero (`-0.5` is one day back, `-1.5` two).
pub fn ttl_days_from_json(value: Option<&Value>) -> i64 {
    let Some(Value::Number(number)) = value else {
        return DEFAULT_TTL_DAYS;
    };
    if let Some(days) = number.as_i64() {
        return if days == 0 { DEFAULT_TTL_DAYS } else { days };
    }
    match number.as_f64() {
        Some(days) if days != 0.0 && days.is_finite() && days.floor().abs() < i64::MAX as f64 => {
            days.floor() as i64
        }
        _ => DEFAULT_TTL_DAYS,
    }
}

/// `now` shifted by `days` calendar days in UTC, keeping the time of day.
///
/// Negative values move backwards, producing an already-expired date.
pub fn expiry_after(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>> {
    let shifted = if days >= 0 {
        now.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        now.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.ok_or_else(|| SealError::InvalidInput(format!("TTL of {} days is out of range", days)))
}
