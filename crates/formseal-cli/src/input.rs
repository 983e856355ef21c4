//! Reading records from arguments or stdin.

use std::io::{self, IsTerminal, Read};

use serde_json::Value;

use formseal_core::store::ttl_days_from_json;
use formseal_core::Record;

use crate::errors::CliError;

/// Read a record from the positional argument, or from stdin when absent.
pub fn read_record(arg: Option<String>) -> anyhow::Result<Record> {
    parse_record(&read_input(arg)?)
}

/// Read a `{"data": {...}, "expiryDays": N}` save request from the
/// positional argument, or from stdin when absent.
pub fn read_save_request(arg: Option<String>) -> anyhow::Result<(Record, i64)> {
    parse_save_request(&read_input(arg)?)
}

fn read_input(arg: Option<String>) -> anyhow::Result<String> {
    if let Some(value) = arg {
        return Ok(value);
    }

    if io::stdin().is_terminal() {
        return Err(CliError::invalid_input(
            "No record provided. Pass RECORD_JSON or pipe it on stdin.",
        )
        .into());
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
    Ok(buffer)
}

fn parse_json(text: &str) -> anyhow::Result<Value> {
    if text.trim().is_empty() {
        return Err(CliError::invalid_input("No input provided on stdin").into());
    }
    let value = serde_json::from_str(text)
        .map_err(|e| CliError::invalid_input(format!("Input is not valid JSON: {}", e)))?;
    Ok(value)
}

/// Parse text as a record. It must be a single JSON object.
pub fn parse_record(text: &str) -> anyhow::Result<Record> {
    Ok(Record::from_value(parse_json(text)?)?)
}

/// Parse a save request body into the record and its TTL in days.
///
/// `expiryDays` follows the loose rule of [`ttl_days_from_json`], so a missing,
/// zero or non-numeric value means the default of seven days.
pub fn parse_save_request(text: &str) -> anyhow::Result<(Record, i64)> {
    let Value::Object(mut body) = parse_json(text)? else {
        return Err(CliError::invalid_input("Save request must be a JSON object").into());
    };
    let data = body
        .remove("data")
        .ok_or_else(|| CliError::invalid_input("Save request is missing \"data\""))?;
    let ttl_days = ttl_days_from_json(body.get("expiryDays"));
    Ok((Record::from_value(data)?, ttl_days))
}
