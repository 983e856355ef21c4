use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use formseal_core::VERSION;

/// Formseal - encryption at rest for a single form record with an expiry date
#[derive(Parser)]
#[command(name = "formseal")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = "FORMSEAL_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the slot file
    #[arg(long, global = true, env = "FORMSEAL_SLOT", value_name = "PATH")]
    pub slot: Option<PathBuf>,

    /// Quiet mode (only errors are logged, save prints nothing)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments for the `seal` command
#[derive(Args)]
pub struct SealArgs {
    /// Record as a JSON object (read from stdin when omitted)
    #[arg(value_name = "RECORD_JSON")]
    pub record: Option<String>,
}

/// Arguments for the `open` command
#[derive(Args)]
pub struct OpenArgs {
    /// Ciphertext as hex
    #[arg(long, value_name = "HEX")]
    pub ciphertext: String,

    /// IV as hex (32 characters)
    #[arg(long, value_name = "HEX")]
    pub iv: String,
}

/// Arguments for the `save` command
#[derive(Args)]
pub struct SaveArgs {
    /// Record as a JSON object (read from stdin when omitted)
    #[arg(value_name = "RECORD_JSON")]
    pub record: Option<String>,

    /// Days until the record expires (defaults to the configured TTL)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub ttl_days: Option<i64>,

    /// Treat the input as a `{"data": {...}, "expiryDays": N}` request body
    #[arg(long, conflicts_with = "ttl_days")]
    pub request: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encrypt a record and print the ciphertext and IV
    Seal(SealArgs),

    /// Decrypt a ciphertext and IV back into a record
    Open(OpenArgs),

    /// Encrypt a record into the slot, replacing what was there
    Save(SaveArgs),

    /// Print the slot's record if it has not expired
    Load,

    /// Show the slot's state without decrypting it
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
