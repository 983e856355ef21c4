//! The expiring record store.
//!
//! Holds at most one sealed record in a single slot, together with its expiry
//! date. States:
//!
//! - **Empty**: nothing saved (or the slot is unreadable)
//! - **Populated**: a record whose expiry date has not passed
//! - **ExpiredPopulated**: a record whose expiry date has passed
//!
//! Expiry is never stored as a flag. It is computed from the clock on every
//! read, and reads never modify the slot.
//!
//! ## Concurrency
//!
//! The backend sits behind a mutex. A save writes the complete slot under the
//! lock and a load reads the complete slot under the lock, so a load never
//! pairs a ciphertext with an expiry date from a different save. Sealing and
//! opening happen outside the lock.

mod clock;
mod slot;
mod ttl;
mod types;

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::SubsecRound;

use crate::crypto::{SealEngine, SealedBundle};
use crate::error::{Result, SealError};
use crate::record::Record;

pub use clock::{Clock, FixedClock, SystemClock};
pub use slot::{FileSlot, MemorySlot, SlotBackend};
pub use ttl::{expiry_after, ttl_days_from_json, DEFAULT_TTL_DAYS};
pub use types::{format_iso, parse_iso, LoadOutcome, SaveReceipt, SlotState, StoredRecord};

/// A single-slot store of one sealed record with an expiry date.
pub struct ExpiringRecordStore<S, C = SystemClock> {
    engine: Arc<SealEngine>,
    slot: Mutex<S>,
    clock: C,
}

impl<S: SlotBackend> ExpiringRecordStore<S, SystemClock> {
    /// Create a store that uses wall-clock time.
    pub fn new(engine: impl Into<Arc<SealEngine>>, slot: S) -> Self {
        Self::with_clock(engine, slot, SystemClock)
    }
}

impl<S: SlotBackend, C: Clock> ExpiringRecordStore<S, C> {
    pub fn with_clock(engine: impl Into<Arc<SealEngine>>, slot: S, clock: C) -> Self {
        Self {
            engine: engine.into(),
            slot: Mutex::new(slot),
            clock,
        }
    }

    /// The engine records are sealed with.
    pub fn engine(&self) -> &SealEngine {
        &self.engine
    }

    /// Seal `record` and overwrite the slot with it.
    ///
    /// `ttl_days` defaults to 7 when `None`. Any other value is honoured as
    /// given: zero or a negative number saves an entry that is already
    /// expired.
    ///
    /// # Errors
    ///
    /// - `SealError::Encryption` if sealing fails
    /// - `SealError::InvalidInput` if the expiry date is out of range
    /// - `SealError::Storage` if the slot cannot be written
    pub fn save(&self, record: &Record, ttl_days: Option<i64>) -> Result<SaveReceipt> {
        let ttl_days = ttl_days.unwrap_or(DEFAULT_TTL_DAYS);
        // Millisecond precision so the returned dates equal the persisted ones.
        let now = self.clock.now().trunc_subsecs(3);
        let expiry_date = expiry_after(now, ttl_days)?;

        let bundle = self.engine.seal(record)?;
        let stored = StoredRecord {
            encrypted_data: bundle.ciphertext_hex(),
            iv: bundle.iv_hex(),
            expiry_date,
            created_at: now,
        };
        let contents = serde_json::to_vec(&stored)
            .map_err(|e| SealError::Storage(format!("Slot serialization failed: {}", e)))?;

        {
            let mut slot = self.lock_slot()?;
            slot.write(&contents).map_err(|e| {
                SealError::Storage(format!("Slot write to {} failed: {}", slot.describe(), e))
            })?;
        }

        tracing::info!(
            ttl_days,
            expiry_date = %format_iso(&expiry_date),
            "Saved record to slot"
        );
        Ok(SaveReceipt::from(&stored))
    }

    /// Read the slot and return the record if it has not expired.
    ///
    /// Expiry is checked before decryption; an expired record is never
    /// decrypted. Slot content that is unreadable, unparsable or does not
    /// decrypt is reported as `LoadOutcome::NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `SealError::Storage` if the slot lock is poisoned.
    pub fn load(&self) -> Result<LoadOutcome> {
        let Some((stored, bundle)) = self.read_slot()? else {
            return Ok(LoadOutcome::NotFound);
        };

        if stored.is_expired_at(self.clock.now()) {
            tracing::info!(
                expiry_date = %format_iso(&stored.expiry_date),
                "Slot record has expired"
            );
            return Ok(LoadOutcome::Expired {
                expiry_date: stored.expiry_date,
            });
        }

        match self.engine.open(&bundle) {
            Ok(record) => Ok(LoadOutcome::Found {
                record,
                expiry_date: stored.expiry_date,
            }),
            Err(err) => {
                tracing::warn!(error = %err, "Slot record does not open; treating as empty");
                Ok(LoadOutcome::NotFound)
            }
        }
    }

    /// The slot's current state, without decrypting.
    pub fn state(&self) -> Result<SlotState> {
        let Some((stored, _)) = self.read_slot()? else {
            return Ok(SlotState::Empty);
        };

        let expired = stored.is_expired_at(self.clock.now());
        let StoredRecord {
            created_at,
            expiry_date,
            ..
        } = stored;
        if expired {
            Ok(SlotState::ExpiredPopulated {
                created_at,
                expiry_date,
            })
        } else {
            Ok(SlotState::Populated {
                created_at,
                expiry_date,
            })
        }
    }

    fn lock_slot(&self) -> Result<MutexGuard<'_, S>> {
        self.slot
            .lock()
            .map_err(|_| SealError::Storage("Slot lock poisoned".to_string()))
    }

    /// Read and parse the slot. Anything short of a well-formed slot is `None`.
    fn read_slot(&self) -> Result<Option<(StoredRecord, SealedBundle)>> {
        let (contents, location) = {
            let slot = self.lock_slot()?;
            (slot.read(), slot.describe())
        };

        let bytes = match contents {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Ok(None),
            Err(err) => {
                tracing::warn!(slot = %location, error = %err, "Slot unreadable; treating as empty");
                return Ok(None);
            }
        };

        let stored: StoredRecord = match serde_json::from_slice(&bytes) {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(slot = %location, error = %err, "Slot content is corrupt; treating as empty");
                return Ok(None);
            }
        };

        match stored.bundle() {
            Ok(bundle) => Ok(Some((stored, bundle))),
            Err(err) => {
                tracing::warn!(slot = %location, error = %err, "Slot bundle is malformed; treating as empty");
                Ok(None)
            }
        }
    }
}
