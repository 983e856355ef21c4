//! Passphrase policy for the sealing key.

use crate::error::{Result, SealError};

/// Minimum passphrase length in characters.
const MIN_PASSPHRASE_LENGTH: usize = 8;

/// Check that a configured passphrase is usable as key material.
///
/// The passphrase must not be blank and must be at least 8 characters long.
///
/// # Examples
///
/// ```
/// use formseal_core::crypto::validate_passphrase;
///
/// assert!(validate_passphrase("my-secret-key-for-aes-256-encryption").is_ok());
/// assert!(validate_passphrase("short").is_err());
/// ```
pub fn validate_passphrase(passphrase: &str) -> Result<()> {
    if passphrase.trim().is_empty() {
        return Err(SealError::InvalidInput(
            "Passphrase cannot be empty".to_string(),
        ));
    }

    let length = passphrase.chars().count();
    if length < MIN_PASSPHRASE_LENGTH {
        return Err(SealError::InvalidInput(format!(
            "Passphrase must be at least {} characters (got {})",
            MIN_PASSPHRASE_LENGTH, length
        )));
    }

    Ok(())
}
