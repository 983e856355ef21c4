//! CLI error types for structured error handling.
//!
//! Typed errors map to specific exit codes. Core errors that reach `main`
//! through `anyhow` are classified by [`exit_code_for`].

use std::fmt;

use formseal_core::SealError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (slot record, config file)
    NotFound { message: String, hint: Option<String> },

    /// The slot's record has expired
    Expired { expiry_date: String },

    /// Invalid user input
    InvalidInput(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::Expired { expiry_date } => {
                write!(f, "Data expired at {}", expiry_date)
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with a message.
    pub fn not_found(message: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: None,
        }
    }

    /// Create a NotFound error with message and hint.
    pub fn not_found_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    pub fn expired(expiry_date: impl Into<String>) -> Self {
        CliError::Expired {
            expiry_date: expiry_date.into(),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::Expired { .. } => exit_codes::EXPIRED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
        }
    }
}

/// Exit code for a core error.
pub fn seal_error_exit_code(err: &SealError) -> i32 {
    if err.is_client_error() {
        exit_codes::INVALID_INPUT
    } else {
        exit_codes::FAILURE
    }
}

/// Exit code for any error that reached `main`.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return cli_err.exit_code();
    }
    if let Some(seal_err) = err.downcast_ref::<SealError>() {
        return seal_error_exit_code(seal_err);
    }
    exit_codes::FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_exit_codes() {
        assert_eq!(CliError::not_found("x").exit_code(), 3);
        assert_eq!(CliError::invalid_input("x").exit_code(), 4);
        assert_eq!(
            CliError::expired("2025-01-01T00:00:00.000Z").exit_code(),
            5
        );
    }

    #[test]
    fn test_seal_errors_map_by_kind() {
        let cases = [
            (SealError::KeyDerivation("x".into()), 1),
            (SealError::Encryption("x".into()), 1),
            (SealError::Storage("x".into()), 1),
            (SealError::Decryption("x".into()), 4),
            (SealError::InvalidInput("x".into()), 4),
        ];
        for (err, code) in cases {
            assert_eq!(exit_code_for(&anyhow::Error::new(err)), code);
        }
    }

    #[test]
    fn test_context_does_not_hide_kind() {
        let err = anyhow::Error::new(SealError::Decryption("Invalid padding".into()))
            .context("Failed to open ciphertext");
        assert_eq!(exit_code_for(&err), 4);
    }

    #[test]
    fn test_other_errors_are_general_failures() {
        assert_eq!(exit_code_for(&anyhow::anyhow!("boom")), 1);
    }

    #[test]
    fn test_not_found_display_includes_hint() {
        let err = CliError::not_found_with_hint("Config not found", "Hint: check --config");
        assert_eq!(err.to_string(), "Config not found\nHint: check --config");
    }
}
