use std::fs;
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::tempdir;

use formseal_core::crypto::{SealEngine, SymmetricKey};
use formseal_core::store::{
    format_iso, parse_iso, ExpiringRecordStore, FileSlot, FixedClock, LoadOutcome, SlotState,
};
use formseal_core::Record;

// scrypt("my-secret-key-for-aes-256-encryption", "salt", N=2^14, r=8, p=1)
const LEGACY_KEY_HEX: &str = "8cf8ec22986e98cd18eb9691cfa5f43ca2c2e6a7bb1bdc4d8a3f1b1c1d419f4c";

fn legacy_engine() -> Arc<SealEngine> {
    let bytes: [u8; 32] = hex::decode(LEGACY_KEY_HEX)
        .expect("key hex should decode")
        .try_into()
        .expect("key should be 32 bytes");
    Arc::new(SealEngine::new(SymmetricKey::from_bytes(bytes)))
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap()
}

fn ann() -> Record {
    r#"{"firstName":"Ann","email":"ann@x.com"}"#
        .parse()
        .expect("record should parse")
}

#[test]
fn test_save_then_load_returns_record_and_expiry() {
    let dir = tempdir().unwrap();
    let store = ExpiringRecordStore::new(legacy_engine(), FileSlot::new(dir.path().join("slot.json")));

    let before = Utc::now();
    let receipt = store.save(&ann(), Some(7)).expect("save should succeed");

    assert_eq!(receipt.iv.len(), 32);
    assert!(receipt.iv.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert!(!receipt.encrypted_data.is_empty());
    assert_eq!(receipt.encrypted_data.len() % 2, 0);

    let expected = before + Duration::days(7);
    let drift = (receipt.expiry_date - expected).num_seconds().abs();
    assert!(drift <= 5, "expiry {} too far from {}", receipt.expiry_date, expected);

    match store.load().expect("load should succeed") {
        LoadOutcome::Found {
            record,
            expiry_date,
        } => {
            assert_eq!(record, ann());
            assert_eq!(expiry_date, receipt.expiry_date);
        }
        other => panic!("expected Found, got {:?}", other),
    }
}

#[test]
fn test_seven_day_ttl_still_found_one_second_later() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FixedClock::new(start()));
    let store = ExpiringRecordStore::with_clock(
        legacy_engine(),
        FileSlot::new(dir.path().join("slot.json")),
        clock.clone(),
    );

    store.save(&ann(), Some(7)).unwrap();
    clock.advance(Duration::seconds(1));

    assert!(matches!(store.load().unwrap(), LoadOutcome::Found { .. }));
}

#[test]
fn test_zero_ttl_is_expired_on_next_load() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FixedClock::new(start()));
    let store = ExpiringRecordStore::with_clock(
        legacy_engine(),
        FileSlot::new(dir.path().join("slot.json")),
        clock.clone(),
    );

    let receipt = store.save(&ann(), Some(0)).unwrap();
    assert_eq!(receipt.expiry_date, start());

    clock.advance(Duration::milliseconds(1));
    assert_eq!(
        store.load().unwrap(),
        LoadOutcome::Expired {
            expiry_date: start()
        }
    );
}

#[test]
fn test_expiry_boundary_across_days() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FixedClock::new(start()));
    let store = ExpiringRecordStore::with_clock(
        legacy_engine(),
        FileSlot::new(dir.path().join("slot.json")),
        clock.clone(),
    );

    store.save(&ann(), None).unwrap();

    clock.set(start() + Duration::days(7));
    assert!(matches!(store.load().unwrap(), LoadOutcome::Found { .. }));

    clock.advance(Duration::milliseconds(1));
    assert!(matches!(store.load().unwrap(), LoadOutcome::Expired { .. }));
    assert!(matches!(
        store.state().unwrap(),
        SlotState::ExpiredPopulated { .. }
    ));
}

#[test]
fn test_negative_ttl_is_already_expired() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FixedClock::new(start()));
    let store = ExpiringRecordStore::with_clock(
        legacy_engine(),
        FileSlot::new(dir.path().join("slot.json")),
        clock,
    );

    let receipt = store.save(&ann(), Some(-3)).unwrap();
    assert_eq!(receipt.expiry_date, start() - Duration::days(3));
    assert!(matches!(store.load().unwrap(), LoadOutcome::Expired { .. }));
}

#[test]
fn test_missing_slot_is_not_found() {
    let dir = tempdir().unwrap();
    let store = ExpiringRecordStore::new(legacy_engine(), FileSlot::new(dir.path().join("slot.json")));
    assert_eq!(store.load().unwrap(), LoadOutcome::NotFound);
    assert_eq!(store.state().unwrap(), SlotState::Empty);
}

#[test]
fn test_corrupt_slot_is_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("slot.json");
    let store = ExpiringRecordStore::new(legacy_engine(), FileSlot::new(&path));

    let corrupt_contents: [&[u8]; 5] = [
        b"",
        b"{not json",
        br#"{"encryptedData":"abcd","iv":"00"}"#,
        br#"{"encryptedData":"zz","iv":"000102030405060708090a0b0c0d0e0f","expiryDate":"2999-01-01T00:00:00.000Z","createdAt":"2025-01-01T00:00:00.000Z"}"#,
        br#"{"encryptedData":"abcd","iv":"0001","expiryDate":"2999-01-01T00:00:00.000Z","createdAt":"2025-01-01T00:00:00.000Z"}"#,
    ];
    for contents in corrupt_contents {
        fs::write(&path, contents).unwrap();
        assert_eq!(
            store.load().unwrap(),
            LoadOutcome::NotFound,
            "{}",
            String::from_utf8_lossy(contents)
        );
    }
}

#[test]
fn test_truncated_slot_after_save_is_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("slot.json");
    let store = ExpiringRecordStore::new(legacy_engine(), FileSlot::new(&path));
    store.save(&ann(), None).unwrap();

    let contents = fs::read(&path).unwrap();
    fs::write(&path, &contents[..contents.len() / 2]).unwrap();

    assert_eq!(store.load().unwrap(), LoadOutcome::NotFound);
}

#[test]
fn test_damaged_ciphertext_is_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("slot.json");
    let store = ExpiringRecordStore::with_clock(
        legacy_engine(),
        FileSlot::new(&path),
        Arc::new(FixedClock::new(start())),
    );
    store.save(&ann(), None).unwrap();

    let mut slot: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    let mut ciphertext = hex::decode(slot["encryptedData"].as_str().unwrap()).unwrap();
    *ciphertext.last_mut().unwrap() ^= 0x01;
    slot["encryptedData"] = serde_json::Value::String(hex::encode(&ciphertext));
    fs::write(&path, serde_json::to_vec(&slot).unwrap()).unwrap();

    assert_eq!(store.load().unwrap(), LoadOutcome::NotFound);
}

#[test]
fn test_slot_sealed_under_other_key_is_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("slot.json");
    let clock = Arc::new(FixedClock::new(start()));
    let writer = ExpiringRecordStore::with_clock(legacy_engine(), FileSlot::new(&path), clock.clone());
    writer.save(&ann(), None).unwrap();

    let other_engine = SealEngine::new(SymmetricKey::from_bytes([9u8; 32]));
    let reader = ExpiringRecordStore::with_clock(other_engine, FileSlot::new(&path), clock);
    assert_eq!(reader.load().unwrap(), LoadOutcome::NotFound);
}

#[test]
fn test_loads_slot_written_by_original_service() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("slot.json");
    fs::write(
        &path,
        concat!(
            r#"{"encryptedData":"6afdf8891d3535642ef0433af5af3caff93e7a2f1e002515686d4704b363a9ea"#,
            r#"ab42e3c17325648bb21211d558abf63c","iv":"000102030405060708090a0b0c0d0e0f","#,
            r#""expiryDate":"2999-01-08T10:00:00.000Z","createdAt":"2999-01-01T10:00:00.000Z"}"#
        ),
    )
    .unwrap();

    let store = ExpiringRecordStore::new(legacy_engine(), FileSlot::new(&path));
    match store.load().unwrap() {
        LoadOutcome::Found {
            record,
            expiry_date,
        } => {
            assert_eq!(record, ann());
            assert_eq!(format_iso(&expiry_date), "2999-01-08T10:00:00.000Z");
        }
        other => panic!("expected Found, got {:?}", other),
    }
}

#[test]
fn test_slot_file_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("slot.json");
    let clock = Arc::new(FixedClock::new(start()));
    let store = ExpiringRecordStore::with_clock(legacy_engine(), FileSlot::new(&path), clock);

    let receipt = store.save(&ann(), Some(7)).unwrap();

    let on_disk: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    let object = on_disk.as_object().expect("slot should be an object");
    let keys: Vec<&str> = object.keys().map(String::as_str).collect();
    let mut expected_keys = vec!["createdAt", "encryptedData", "expiryDate", "iv"];
    let mut sorted_keys = keys.clone();
    sorted_keys.sort_unstable();
    expected_keys.sort_unstable();
    assert_eq!(sorted_keys, expected_keys);
    assert!(object.values().all(|v| v.is_string()));

    assert_eq!(object["encryptedData"], receipt.encrypted_data.as_str());
    assert_eq!(object["iv"], receipt.iv.as_str());
    assert_eq!(object["expiryDate"], "2025-06-08T08:30:00.000Z");
    assert_eq!(object["createdAt"], "2025-06-01T08:30:00.000Z");
    assert_eq!(
        parse_iso(object["expiryDate"].as_str().unwrap()).unwrap(),
        receipt.expiry_date
    );

    let haystack = String::from_utf8_lossy(&fs::read(&path).unwrap()).to_string();
    assert!(!haystack.contains("ann@x.com"));
}

#[test]
fn test_save_overwrites_previous_record() {
    let dir = tempdir().unwrap();
    let store = ExpiringRecordStore::new(legacy_engine(), FileSlot::new(dir.path().join("slot.json")));

    store.save(&ann(), Some(1)).unwrap();
    let mut bob = Record::new();
    bob.insert("firstName", "Bob");
    store.save(&bob, Some(2)).unwrap();

    match store.load().unwrap() {
        LoadOutcome::Found { record, .. } => assert_eq!(record, bob),
        other => panic!("expected Found, got {:?}", other),
    }
}

#[test]
fn test_concurrent_saves_never_tear_the_slot() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FixedClock::new(start()));
    let store = Arc::new(ExpiringRecordStore::with_clock(
        legacy_engine(),
        FileSlot::new(dir.path().join("slot.json")),
        clock,
    ));

    let writers: Vec<_> = (1..=8i64)
        .map(|n| {
            let store = store.clone();
            thread::spawn(move || {
                let mut record = Record::new();
                record.insert("n", n);
                for _ in 0..10 {
                    store.save(&record, Some(n)).unwrap();
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..20 {
                    match store.load().unwrap() {
                        LoadOutcome::NotFound => {}
                        LoadOutcome::Found {
                            record,
                            expiry_date,
                        } => {
                            let n = record.get("n").and_then(|v| v.as_i64()).unwrap();
                            assert_eq!(expiry_date, start() + Duration::days(n));
                        }
                        LoadOutcome::Expired { .. } => panic!("nothing saved here expires"),
                    }
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    match store.load().unwrap() {
        LoadOutcome::Found {
            record,
            expiry_date,
        } => {
            let n = record.get("n").and_then(|v| v.as_i64()).unwrap();
            assert_eq!(expiry_date, start() + Duration::days(n));
        }
        other => panic!("expected Found, got {:?}", other),
    }
}
