use std::fmt;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;

use formseal_core::crypto::{
    validate_passphrase, KdfParams, ARGON2_ITERATIONS, ARGON2_MEMORY_KIB, ARGON2_PARALLELISM,
    SCRYPT_LOG_N, SCRYPT_P, SCRYPT_R,
};
use formseal_core::store::DEFAULT_TTL_DAYS;

use crate::constants::{BUILTIN_PASSPHRASE, BUILTIN_SALT};
use crate::errors::CliError;

/// Contents of `config.toml`. Every section and field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormsealConfig {
    pub keys: KeysSection,
    pub kdf: KdfSection,
    pub store: StoreSection,
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeysSection {
    pub passphrase: Option<String>,
    pub salt: Option<String>,
}

impl fmt::Debug for KeysSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeysSection")
            .field("passphrase", &self.passphrase.as_ref().map(|_| "[REDACTED]"))
            .field("salt", &self.salt)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KdfSection {
    pub algorithm: KdfAlgorithm,
    pub log_n: Option<u8>,
    pub r: Option<u32>,
    pub p: Option<u32>,
    pub memory_kib: Option<u32>,
    pub iterations: Option<u32>,
    pub parallelism: Option<u32>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KdfAlgorithm {
    #[default]
    Scrypt,
    Argon2id,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    pub path: Option<String>,
    pub default_ttl_days: Option<i64>,
}

impl KdfSection {
    /// The algorithm's defaults with any configured overrides applied.
    pub fn params(&self) -> KdfParams {
        match self.algorithm {
            KdfAlgorithm::Scrypt => KdfParams::Scrypt {
                log_n: self.log_n.unwrap_or(SCRYPT_LOG_N),
                r: self.r.unwrap_or(SCRYPT_R),
                p: self.p.unwrap_or(SCRYPT_P),
            },
            KdfAlgorithm::Argon2id => KdfParams::Argon2id {
                memory_kib: self.memory_kib.unwrap_or(ARGON2_MEMORY_KIB),
                iterations: self.iterations.unwrap_or(ARGON2_ITERATIONS),
                parallelism: self.parallelism.unwrap_or(ARGON2_PARALLELISM),
            },
        }
    }
}

/// Where the passphrase in use came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassphraseSource {
    Environment,
    Config,
    BuiltIn,
}

/// Fully resolved runtime settings.
#[derive(Debug)]
pub struct Settings {
    pub passphrase: SecretString,
    pub passphrase_source: PassphraseSource,
    pub salt: String,
    pub kdf: KdfParams,
    pub slot_path: PathBuf,
    pub default_ttl_days: i64,
}

impl Settings {
    /// Merge a parsed config with command-line and environment overrides.
    ///
    /// Precedence for the passphrase is environment, then config, then the
    /// built-in value; for the slot path it is `--slot`/`FORMSEAL_SLOT`, then
    /// config, then the XDG data directory.
    pub fn resolve(
        config: FormsealConfig,
        passphrase_override: Option<String>,
        slot_override: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let FormsealConfig { keys, kdf, store } = config;

        let (passphrase, passphrase_source) = match (passphrase_override, keys.passphrase) {
            (Some(value), _) if !value.trim().is_empty() => (value, PassphraseSource::Environment),
            (_, Some(value)) => (value, PassphraseSource::Config),
            _ => (BUILTIN_PASSPHRASE.to_string(), PassphraseSource::BuiltIn),
        };
        if passphrase_source != PassphraseSource::BuiltIn {
            validate_passphrase(&passphrase).map_err(|e| {
                CliError::invalid_input(format!("Passphrase does not meet requirements: {}", e))
            })?;
        }

        let salt = keys.salt.unwrap_or_else(|| BUILTIN_SALT.to_string());
        if salt.is_empty() {
            return Err(CliError::invalid_input("Config keys.salt cannot be empty").into());
        }

        let slot_path = match (slot_override, store.path) {
            (Some(path), _) => path,
            (None, Some(path)) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_slot_path()?,
        };

        Ok(Self {
            passphrase: SecretString::from(passphrase),
            passphrase_source,
            salt,
            kdf: kdf.params(),
            slot_path,
            default_ttl_days: store.default_ttl_days.unwrap_or(DEFAULT_TTL_DAYS),
        })
    }
}

/// Load the config file, falling back to defaults when the default path is absent.
///
/// An explicitly named config file (`--config` / `FORMSEAL_CONFIG`) must exist.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<FormsealConfig> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::not_found_with_hint(
                    format!("Config file not found: {}", path.display()),
                    "Hint: check --config or FORMSEAL_CONFIG.",
                )
                .into());
            }
            read_config(path)
        }
        None => {
            let path = default_config_path()?;
            if path.exists() {
                read_config(&path)
            } else {
                tracing::debug!(path = %path.display(), "No config file; using defaults");
                Ok(FormsealConfig::default())
            }
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_slot_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("slot.json"))
}

pub fn read_config(path: &Path) -> anyhow::Result<FormsealConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents).map_err(|e| {
        anyhow::Error::new(CliError::invalid_input(format!(
            "Failed to parse config {}: {}",
            path.display(),
            e
        )))
    })
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("formseal"));
        }
    }
    Ok(home_dir()?.join(".config").join("formseal"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("formseal"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("formseal"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
