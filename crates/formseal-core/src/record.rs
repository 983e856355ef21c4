//! The record type and its canonical byte encoding.
//!
//! A record is a JSON object whose contents the engine never interprets. What
//! gets encrypted is the record's canonical encoding, so the same record always
//! produces the same plaintext regardless of how its fields were inserted.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SealError};

/// A JSON object of field name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap an existing JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(SealError::InvalidInput(format!(
                "Record must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field, returning the previous value if there was one.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromStr for Record {
    type Err = SealError;

    fn from_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_value(value)
    }
}

/// Versioned plaintext encodings for records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum RecordEncoding {
    /// Compact UTF-8 JSON with object keys sorted by byte order at every level.
    ///
    /// Decoding accepts any key order, so plaintext written by producers that
    /// kept insertion order still decodes to the same record.
    #[default]
    JsonV1,
}

impl RecordEncoding {
    /// Encode a record into plaintext bytes.
    pub fn encode(self, record: &Record) -> Result<Vec<u8>> {
        match self {
            RecordEncoding::JsonV1 => {
                let canonical = canonicalize(&Value::Object(record.0.clone()));
                serde_json::to_vec(&canonical).map_err(|e| {
                    SealError::Encryption(format!("Record serialization failed: {}", e))
                })
            }
        }
    }

    /// Decode plaintext bytes back into a record.
    ///
    /// Fails with [`SealError::Decryption`], since plaintext that is not a
    /// record means the bundle was wrong or corrupted.
    pub fn decode(self, bytes: &[u8]) -> Result<Record> {
        match self {
            RecordEncoding::JsonV1 => {
                let text = std::str::from_utf8(bytes).map_err(|_| {
                    SealError::Decryption("Decrypted data is not valid UTF-8".to_string())
                })?;
                let value: Value = serde_json::from_str(text).map_err(|e| {
                    SealError::Decryption(format!("Decrypted data is not valid JSON: {}", e))
                })?;
                match value {
                    Value::Object(map) => Ok(Record(map)),
                    other => Err(SealError::Decryption(format!(
                        "Decrypted data is not a record (found {})",
                        json_kind(&other)
                    ))),
                }
            }
        }
    }
}

/// Rebuild a value with every object's keys inserted in sorted order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (key, inner) in entries {
                sorted.insert(key.clone(), canonicalize(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
