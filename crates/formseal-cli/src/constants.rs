//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// - 0: Success
/// - 1: General error (key derivation, encryption, storage)
/// - 2: Misuse of shell command (reserved by clap)
/// - 3+: Application-specific outcomes
pub mod exit_codes {
    /// Unexpected failure; retrying may succeed.
    pub const FAILURE: i32 = 1;

    /// The slot holds no record, or a config file named explicitly is missing.
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input, or a ciphertext that does not open.
    pub const INVALID_INPUT: i32 = 4;

    /// The slot's record has expired.
    pub const EXPIRED: i32 = 5;
}

/// Environment variable that overrides the configured passphrase.
pub const PASSPHRASE_ENV: &str = "FORMSEAL_PASSPHRASE";

/// Passphrase and salt existing slots were sealed with.
pub const BUILTIN_PASSPHRASE: &str = "my-secret-key-for-aes-256-encryption";
pub const BUILTIN_SALT: &str = "salt";

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "formseal=warn";
pub const QUIET_LOG_FILTER: &str = "formseal=error";
