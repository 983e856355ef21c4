//! Application context for the Formseal CLI.
//!
//! Bundles CLI arguments with lazily-resolved settings and the sealing
//! engine, so the key is derived at most once per invocation and only by
//! commands that need it.

use std::sync::Arc;

use once_cell::unsync::OnceCell;
use secrecy::ExposeSecret;

use formseal_core::crypto::SealEngine;
use formseal_core::store::{ExpiringRecordStore, FileSlot};

use crate::cli::Cli;
use crate::config::{load_config, PassphraseSource, Settings};
use crate::constants::PASSPHRASE_ENV;

pub struct AppContext<'a> {
    cli: &'a Cli,
    settings: OnceCell<Settings>,
    engine: OnceCell<Arc<SealEngine>>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            settings: OnceCell::new(),
            engine: OnceCell::new(),
        }
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Get the resolved settings, loading config on first use.
    pub fn settings(&self) -> anyhow::Result<&Settings> {
        self.settings.get_or_try_init(|| load_settings(self.cli))
    }

    /// Get the sealing engine, deriving its key on first use.
    pub fn engine(&self) -> anyhow::Result<Arc<SealEngine>> {
        let engine = self.engine.get_or_try_init(|| {
            let settings = self.settings()?;
            if settings.passphrase_source == PassphraseSource::BuiltIn {
                tracing::warn!(
                    "Using the built-in passphrase; set {} or keys.passphrase in the config",
                    PASSPHRASE_ENV
                );
            }
            let engine = SealEngine::derive(
                settings.passphrase.expose_secret(),
                settings.salt.as_bytes(),
                &settings.kdf,
            )?;
            Ok::<_, anyhow::Error>(Arc::new(engine))
        })?;
        Ok(Arc::clone(engine))
    }

    /// Open the store over the configured slot file.
    pub fn store(&self) -> anyhow::Result<ExpiringRecordStore<FileSlot>> {
        let engine = self.engine()?;
        let slot = FileSlot::new(&self.settings()?.slot_path);
        tracing::debug!(slot = %slot.path().display(), "Opening slot");
        Ok(ExpiringRecordStore::new(engine, slot))
    }
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let config = load_config(cli.config.as_deref())?;
    let passphrase = std::env::var(PASSPHRASE_ENV).ok();
    Settings::resolve(config, passphrase, cli.slot.clone())
}
