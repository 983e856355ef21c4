//! Cryptographic operations for Formseal.
//!
//! - **scrypt / Argon2id**: slow key derivation from a static passphrase
//! - **AES-256-CBC + PKCS#7**: record sealing with a fresh random IV per seal
//!
//! ## Security Model
//!
//! - One process-wide key, derived once when the engine is built
//! - Key material zeroized from memory on drop and redacted from `Debug`
//! - IVs come from the operating system's CSPRNG and are never caller-chosen
//!
//! CBC carries no authentication tag. Tampering is detected only to the extent
//! that it breaks the padding or the record syntax.

pub mod engine;
pub mod key;
pub mod passphrase;

pub use engine::{SealEngine, SealedBundle, IV_LENGTH};
pub use key::{
    derive_key, KdfParams, SymmetricKey, ARGON2_ITERATIONS, ARGON2_MEMORY_KIB, ARGON2_PARALLELISM,
    KEY_LENGTH, SCRYPT_LOG_N, SCRYPT_P, SCRYPT_R,
};
pub use passphrase::validate_passphrase;
