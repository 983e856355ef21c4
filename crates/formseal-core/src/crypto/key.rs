//! Key derivation.
//!
//! Derives the 256-bit sealing key from a passphrase and salt with a
//! memory-hard function. scrypt is the default because stores written by the
//! original service were keyed with it; Argon2id is available for new
//! deployments.

use argon2::Argon2;
use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

use crate::error::{Result, SealError};

/// Length of the derived key in bytes (AES-256).
pub const KEY_LENGTH: usize = 32;

/// scrypt defaults: N = 2^14, r = 8, p = 1.
pub const SCRYPT_LOG_N: u8 = 14;
pub const SCRYPT_R: u32 = 8;
pub const SCRYPT_P: u32 = 1;

/// Argon2id defaults: 64 MB, 3 passes, single lane.
pub const ARGON2_MEMORY_KIB: u32 = 64 * 1024;
pub const ARGON2_ITERATIONS: u32 = 3;
pub const ARGON2_PARALLELISM: u32 = 1;

/// Argon2 refuses salts shorter than this.
const ARGON2_MIN_SALT_LENGTH: usize = 8;

/// Key derivation function and its cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum KdfParams {
    Scrypt { log_n: u8, r: u32, p: u32 },
    Argon2id {
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    },
}

impl KdfParams {
    /// scrypt with the parameters existing stores were written with.
    pub fn scrypt_default() -> Self {
        KdfParams::Scrypt {
            log_n: SCRYPT_LOG_N,
            r: SCRYPT_R,
            p: SCRYPT_P,
        }
    }

    pub fn argon2id_default() -> Self {
        KdfParams::Argon2id {
            memory_kib: ARGON2_MEMORY_KIB,
            iterations: ARGON2_ITERATIONS,
            parallelism: ARGON2_PARALLELISM,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            KdfParams::Scrypt { .. } => "scrypt",
            KdfParams::Argon2id { .. } => "argon2id",
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::scrypt_default()
    }
}

/// The process-wide symmetric key.
///
/// Zeroized on drop. Neither `Debug` nor any serializer exposes the bytes.
#[derive(Clone, ZeroizeOnDrop)]
pub struct SymmetricKey {
    key: [u8; KEY_LENGTH],
}

impl SymmetricKey {
    /// Wrap raw key bytes.
    ///
    /// The caller is responsible for the bytes coming from a secure source.
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Raw key bytes. Use only for immediate cipher operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive a key from a passphrase and salt.
///
/// Deterministic: the same passphrase, salt and parameters always produce the
/// same key, so bundles sealed by one process open in another.
///
/// # Errors
///
/// Returns `SealError::KeyDerivation` if:
/// - The passphrase or salt is empty
/// - The salt is shorter than 8 bytes under Argon2id
/// - The cost parameters are rejected by the underlying function
///
/// # Examples
///
/// ```
/// use formseal_core::crypto::{derive_key, KdfParams};
///
/// let params = KdfParams::Scrypt { log_n: 4, r: 8, p: 1 };
/// let a = derive_key("my-passphrase", b"salt", &params).unwrap();
/// let b = derive_key("my-passphrase", b"salt", &params).unwrap();
/// assert_eq!(a.as_bytes(), b.as_bytes());
/// ```
pub fn derive_key(passphrase: &str, salt: &[u8], params: &KdfParams) -> Result<SymmetricKey> {
    if passphrase.is_empty() {
        return Err(SealError::KeyDerivation(
            "Passphrase cannot be empty".to_string(),
        ));
    }
    if salt.is_empty() {
        return Err(SealError::KeyDerivation("Salt cannot be empty".to_string()));
    }

    let mut key_bytes = [0u8; KEY_LENGTH];
    match *params {
        KdfParams::Scrypt { log_n, r, p } => {
            let scrypt_params = scrypt::Params::new(log_n, r, p, KEY_LENGTH).map_err(|e| {
                SealError::KeyDerivation(format!("Invalid scrypt params: {}", e))
            })?;
            scrypt::scrypt(passphrase.as_bytes(), salt, &scrypt_params, &mut key_bytes)
                .map_err(|e| SealError::KeyDerivation(format!("Key derivation failed: {}", e)))?;
        }
        KdfParams::Argon2id {
            memory_kib,
            iterations,
            parallelism,
        } => {
            if salt.len() < ARGON2_MIN_SALT_LENGTH {
                return Err(SealError::KeyDerivation(format!(
                    "Salt must be at least {} bytes for argon2id",
                    ARGON2_MIN_SALT_LENGTH
                )));
            }
            let argon2_params =
                argon2::Params::new(memory_kib, iterations, parallelism, Some(KEY_LENGTH))
                    .map_err(|e| {
                        SealError::KeyDerivation(format!("Invalid Argon2 params: {}", e))
                    })?;
            Argon2::new(
                argon2::Algorithm::Argon2id,
                argon2::Version::V0x13,
                argon2_params,
            )
            .hash_password_into(passphrase.as_bytes(), salt, &mut key_bytes)
            .map_err(|e| SealError::KeyDerivation(format!("Key derivation failed: {}", e)))?;
        }
    }

    Ok(SymmetricKey::from_bytes(key_bytes))
}
