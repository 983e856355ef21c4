//! Data types for the expiring record store.
//!
//! `StoredRecord` is the on-disk slot format. Field names and timestamp
//! formatting match slot files written by the original service, so existing
//! slots keep loading.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::SealedBundle;
use crate::error::Result;
use crate::record::Record;

/// The persisted content of the single slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    /// Lowercase hex ciphertext
    pub encrypted_data: String,

    /// Lowercase hex IV
    pub iv: String,

    /// After this instant the record is never returned
    #[serde(with = "iso_millis")]
    pub expiry_date: DateTime<Utc>,

    /// When the record was saved
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
}

impl StoredRecord {
    /// Expiry is strict: a record is still live at exactly its expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry_date
    }

    /// Decode the hex fields into a bundle the engine can open.
    pub fn bundle(&self) -> Result<SealedBundle> {
        SealedBundle::from_hex(&self.encrypted_data, &self.iv)
    }
}

/// What `save` hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    pub encrypted_data: String,
    pub iv: String,
    #[serde(with = "iso_millis")]
    pub expiry_date: DateTime<Utc>,
}

impl From<&StoredRecord> for SaveReceipt {
    fn from(stored: &StoredRecord) -> Self {
        SaveReceipt {
            encrypted_data: stored.encrypted_data.clone(),
            iv: stored.iv.clone(),
            expiry_date: stored.expiry_date,
        }
    }
}

/// Result of reading the slot.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Nothing saved yet, or the slot content is unreadable
    NotFound,

    /// A record exists but its expiry date has passed; it was not decrypted
    Expired { expiry_date: DateTime<Utc> },

    /// A live record, decrypted
    Found {
        record: Record,
        expiry_date: DateTime<Utc>,
    },
}

/// The slot's state as seen at a given instant, without decrypting anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum SlotState {
    Empty,
    Populated {
        #[serde(with = "iso_millis")]
        created_at: DateTime<Utc>,
        #[serde(with = "iso_millis")]
        expiry_date: DateTime<Utc>,
    },
    ExpiredPopulated {
        #[serde(with = "iso_millis")]
        created_at: DateTime<Utc>,
        #[serde(with = "iso_millis")]
        expiry_date: DateTime<Utc>,
    },
}

/// Format as ISO-8601 UTC with milliseconds, e.g. `2025-01-08T09:30:00.000Z`.
pub fn format_iso(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse any RFC 3339 timestamp into UTC.
pub fn parse_iso(value: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|parsed| parsed.with_timezone(&Utc))
}

pub(crate) mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        instant: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_iso(instant))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let value = String::deserialize(deserializer)?;
        super::parse_iso(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32, ms: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 8, h, m, s).unwrap()
            + chrono::Duration::milliseconds(ms as i64)
    }

    #[test]
    fn test_stored_record_field_order_and_format() {
        let stored = StoredRecord {
            encrypted_data: "abcd".to_string(),
            iv: "00".repeat(16),
            expiry_date: at(9, 30, 0, 5),
            created_at: at(9, 0, 0, 0),
        };
        let json = serde_json::to_string(&stored).unwrap();
        assert_eq!(
            json,
            format!(
                r#"{{"encryptedData":"abcd","iv":"{}","expiryDate":"2025-01-08T09:30:00.005Z","createdAt":"2025-01-08T09:00:00.000Z"}}"#,
                "00".repeat(16)
            )
        );
    }

    #[test]
    fn test_stored_record_parses_offsets() {
        let json = r#"{"encryptedData":"ab","iv":"cd","expiryDate":"2025-01-08T11:30:00.000+02:00","createdAt":"2025-01-08T09:00:00Z"}"#;
        let stored: StoredRecord = serde_json::from_str(json).unwrap();
        assert_eq!(stored.expiry_date, at(9, 30, 0, 0));
        assert_eq!(stored.created_at, at(9, 0, 0, 0));
    }

    #[test]
    fn test_stored_record_rejects_bad_dates() {
        let json = r#"{"encryptedData":"ab","iv":"cd","expiryDate":"next week","createdAt":"2025-01-08T09:00:00Z"}"#;
        assert!(serde_json::from_str::<StoredRecord>(json).is_err());
    }

    #[test]
    fn test_expiry_is_strict() {
        let stored = StoredRecord {
            encrypted_data: String::new(),
            iv: String::new(),
            expiry_date: at(12, 0, 0, 0),
            created_at: at(11, 0, 0, 0),
        };
        assert!(!stored.is_expired_at(at(11, 59, 59, 999)));
        assert!(!stored.is_expired_at(at(12, 0, 0, 0)));
        assert!(stored.is_expired_at(at(12, 0, 0, 1)));
    }

    #[test]
    fn test_slot_state_serialization() {
        let state = SlotState::ExpiredPopulated {
            created_at: at(9, 0, 0, 0),
            expiry_date: at(10, 0, 0, 0),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "expired_populated");
        assert_eq!(json["expiryDate"], "2025-01-08T10:00:00.000Z");
        assert_eq!(json["createdAt"], "2025-01-08T09:00:00.000Z");
        assert!(json.get("expiry_date").is_none());

        let json = serde_json::to_value(SlotState::Empty).unwrap();
        assert_eq!(json["state"], "empty");
    }
}
