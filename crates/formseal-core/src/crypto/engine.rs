//! The sealing engine.
//!
//! `seal` encodes a record canonically and encrypts it with AES-256-CBC under
//! the process key and a fresh random IV. `open` reverses it. The engine holds
//! nothing mutable, so one instance can be shared across threads.

use std::fmt;
use std::time::Instant;

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::key::{derive_key, KdfParams, SymmetricKey};
use crate::error::{Result, SealError};
use crate::record::{Record, RecordEncoding};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Length of the initialization vector in bytes.
pub const IV_LENGTH: usize = 16;

const BLOCK_SIZE: usize = 16;

/// Ciphertext plus the IV it was sealed with.
///
/// Serializes as `{"encryptedData": "<hex>", "iv": "<hex>"}` with lowercase
/// hex, the shape callers exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HexBundle", into = "HexBundle")]
pub struct SealedBundle {
    ciphertext: Vec<u8>,
    iv: [u8; IV_LENGTH],
}

impl SealedBundle {
    pub fn new(ciphertext: Vec<u8>, iv: [u8; IV_LENGTH]) -> Self {
        Self { ciphertext, iv }
    }

    /// Parse a bundle from its hex-encoded parts.
    ///
    /// # Errors
    ///
    /// Returns `SealError::Decryption` if either part is not valid hex or the
    /// IV is not exactly 16 bytes.
    pub fn from_hex(ciphertext_hex: &str, iv_hex: &str) -> Result<Self> {
        let ciphertext = hex::decode(ciphertext_hex)
            .map_err(|e| SealError::Decryption(format!("Ciphertext is not valid hex: {}", e)))?;
        let iv_bytes = hex::decode(iv_hex)
            .map_err(|e| SealError::Decryption(format!("IV is not valid hex: {}", e)))?;
        let iv: [u8; IV_LENGTH] = iv_bytes.as_slice().try_into().map_err(|_| {
            SealError::Decryption(format!(
                "IV must be {} bytes (got {})",
                IV_LENGTH,
                iv_bytes.len()
            ))
        })?;
        Ok(Self { ciphertext, iv })
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn iv(&self) -> &[u8; IV_LENGTH] {
        &self.iv
    }

    /// Lowercase hex of the ciphertext.
    pub fn ciphertext_hex(&self) -> String {
        hex::encode(&self.ciphertext)
    }

    /// Lowercase hex of the IV (always 32 characters).
    pub fn iv_hex(&self) -> String {
        hex::encode(self.iv)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HexBundle {
    encrypted_data: String,
    iv: String,
}

impl TryFrom<HexBundle> for SealedBundle {
    type Error = SealError;

    fn try_from(value: HexBundle) -> Result<Self> {
        SealedBundle::from_hex(&value.encrypted_data, &value.iv)
    }
}

impl From<SealedBundle> for HexBundle {
    fn from(bundle: SealedBundle) -> Self {
        HexBundle {
            encrypted_data: bundle.ciphertext_hex(),
            iv: bundle.iv_hex(),
        }
    }
}

/// Seals and opens records under one process-wide key.
pub struct SealEngine {
    key: SymmetricKey,
    encoding: RecordEncoding,
}

impl SealEngine {
    /// Build an engine around an already-derived key.
    pub fn new(key: SymmetricKey) -> Self {
        Self {
            key,
            encoding: RecordEncoding::default(),
        }
    }

    /// Derive the process key and build the engine.
    ///
    /// Intended to run once at startup. A failure here means the process
    /// cannot serve any request.
    pub fn derive(passphrase: &str, salt: &[u8], params: &KdfParams) -> Result<Self> {
        let started = Instant::now();
        let key = derive_key(passphrase, salt, params)?;
        tracing::info!(
            kdf = params.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Derived sealing key"
        );
        Ok(Self::new(key))
    }

    /// Encrypt a record under a fresh random IV.
    ///
    /// Sealing the same record twice yields different bundles.
    ///
    /// # Errors
    ///
    /// Returns `SealError::Encryption` if the random source or the cipher
    /// cannot be initialised. No partial output is produced.
    pub fn seal(&self, record: &Record) -> Result<SealedBundle> {
        let iv = generate_iv()?;
        self.seal_with_iv(record, iv)
    }

    fn seal_with_iv(&self, record: &Record, iv: [u8; IV_LENGTH]) -> Result<SealedBundle> {
        let plaintext = Zeroizing::new(self.encoding.encode(record)?);
        let cipher = Aes256CbcEnc::new_from_slices(self.key.as_bytes(), &iv)
            .map_err(|e| SealError::Encryption(format!("Cipher initialisation failed: {}", e)))?;
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(&plaintext);

        tracing::debug!(
            fields = record.len(),
            ciphertext_bytes = ciphertext.len(),
            "Sealed record"
        );
        Ok(SealedBundle::new(ciphertext, iv))
    }

    /// Decrypt a bundle back into a record.
    ///
    /// # Errors
    ///
    /// Returns `SealError::Decryption` if:
    /// - The ciphertext is empty or not a whole number of blocks
    /// - The padding is invalid (tampered data or the wrong key)
    /// - The plaintext is not a JSON object
    pub fn open(&self, bundle: &SealedBundle) -> Result<Record> {
        let ciphertext = bundle.ciphertext();
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(SealError::Decryption(format!(
                "Ciphertext length {} is not a positive multiple of {}",
                ciphertext.len(),
                BLOCK_SIZE
            )));
        }

        let cipher = Aes256CbcDec::new_from_slices(self.key.as_bytes(), bundle.iv())
            .map_err(|e| SealError::Decryption(format!("Cipher initialisation failed: {}", e)))?;
        let plaintext = Zeroizing::new(
            cipher
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                .map_err(|_| SealError::Decryption("Invalid padding".to_string()))?,
        );

        let record = self.encoding.decode(&plaintext)?;
        tracing::debug!(fields = record.len(), "Opened record");
        Ok(record)
    }

    /// Decrypt hex-encoded ciphertext and IV, as exchanged with callers.
    pub fn open_hex(&self, ciphertext_hex: &str, iv_hex: &str) -> Result<Record> {
        let bundle = SealedBundle::from_hex(ciphertext_hex, iv_hex)?;
        self.open(&bundle)
    }
}

impl fmt::Debug for SealEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealEngine")
            .field("key", &self.key)
            .field("encoding", &self.encoding)
            .finish()
    }
}

fn generate_iv() -> Result<[u8; IV_LENGTH]> {
    let mut iv = [0u8; IV_LENGTH];
    getrandom::getrandom(&mut iv)
        .map_err(|e| SealError::Encryption(format!("Random source unavailable: {}", e)))?;
    Ok(iv)
}
