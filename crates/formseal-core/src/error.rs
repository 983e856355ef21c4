//! Error types for Formseal core operations.
//!
//! Every failure inside the core is converted into one of these kinds at the
//! component boundary. An expired record is not an error; it is reported as
//! [`crate::store::LoadOutcome::Expired`].

use thiserror::Error;

/// Result type alias for Formseal operations.
pub type Result<T> = std::result::Result<T, SealError>;

/// Core error type for Formseal operations.
#[derive(Debug, Error)]
pub enum SealError {
    /// Key derivation failed; the process cannot serve any request
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Random source or cipher initialisation failed while sealing
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Malformed IV or ciphertext, bad padding, or plaintext that is not a record
    #[error("Decryption error: {0}")]
    Decryption(String),

    /// Slot backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SealError {
    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SealError::Encryption(_) | SealError::Storage(_))
    }

    /// Whether the failure was caused by the caller's input rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SealError::Decryption(_) | SealError::InvalidInput(_))
    }
}

impl From<std::io::Error> for SealError {
    fn from(err: std::io::Error) -> Self {
        SealError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for SealError {
    fn from(err: serde_json::Error) -> Self {
        SealError::InvalidInput(err.to_string())
    }
}
