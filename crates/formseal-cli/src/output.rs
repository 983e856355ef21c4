//! JSON response shapes printed on stdout.
//!
//! Field names match what existing form clients expect from the save and
//! load endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use formseal_core::store::format_iso;
use formseal_core::Record;

/// Body for a live record returned by `load`.
pub fn load_found_json(record: &Record, expiry_date: &DateTime<Utc>) -> Value {
    json!({
        "data": record,
        "expiryDate": format_iso(expiry_date),
    })
}

/// Body for `load` when the record has expired.
pub fn load_expired_json() -> Value {
    json!({
        "expired": true,
        "message": "Data expired",
    })
}

/// Body for `load` when the slot holds nothing.
pub fn load_not_found_json() -> Value {
    json!({ "error": "No data found" })
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| anyhow::anyhow!("Failed to render JSON: {}", e))?;
    println!("{}", rendered);
    Ok(())
}
