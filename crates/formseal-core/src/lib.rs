//! # Formseal Core
//!
//! Core library for Formseal - encryption at rest for a single form record
//! with an expiry date.
//!
//! This crate provides key derivation, the sealing engine, and the expiring
//! single-slot store, independent of any transport.
//!
//! ## Architecture
//!
//! - **crypto**: Key derivation (scrypt / Argon2id) and the AES-256-CBC engine
//! - **record**: The record type and its canonical encoding
//! - **store**: The expiring record store and its slot backends
//! - **fs**: Atomic file replacement helpers
//!
//! ## Example
//!
//! ```
//! use formseal_core::crypto::{SealEngine, SymmetricKey};
//! use formseal_core::store::{ExpiringRecordStore, LoadOutcome, MemorySlot};
//! use formseal_core::Record;
//!
//! let engine = SealEngine::new(SymmetricKey::from_bytes([7u8; 32]));
//! let store = ExpiringRecordStore::new(engine, MemorySlot::new());
//!
//! let record: Record = serde_json::from_str(r#"{"firstName":"Ann"}"#).unwrap();
//! store.save(&record, None).unwrap();
//!
//! match store.load().unwrap() {
//!     LoadOutcome::Found { record: loaded, .. } => assert_eq!(loaded, record),
//!     other => panic!("unexpected outcome: {:?}", other),
//! }
//! ```

pub mod crypto;
pub mod error;
pub mod fs;
pub mod record;
pub mod store;

pub use error::{Result, SealError};
pub use record::Record;
pub use store::{ExpiringRecordStore, LoadOutcome};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
