//! # Config Store
//!
//! Holds the session's single `Configuration` record. `load` replaces it from the
//! host, `save` pushes the whole record back. Other components read and edit it in
//! place; the last writer wins.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::application::retry::RetryPolicy;
use crate::domain::config::Configuration;
use crate::domain::error::HostResult;
use crate::domain::traits::Host;

pub struct ConfigStore {
    host: Arc<dyn Host>,
    config: Mutex<Configuration>,
    retry: RetryPolicy,
}

impl ConfigStore {
    pub fn new(host: Arc<dyn Host>, retry: RetryPolicy) -> Self {
        Self {
            host,
            config: Mutex::new(Configuration::default()),
            retry,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Configuration> {
        self.config.lock().unwrap_or_else(|e| {
            tracing::warn!("config mutex poisoned, recovering");
            e.into_inner()
        })
    }

    /// Replaces the local record with the host's copy.
    /// On failure the local record is left as it was.
    pub async fn load(&self) -> HostResult {
        let config = self.host.get_config().await?;
        *self.lock() = config;
        tracing::info!("Loaded configuration from host");
        Ok(())
    }

    /// Persists the current record, retrying transient failures.
    pub async fn save(&self) -> HostResult {
        let snapshot = self.snapshot();
        let host = &self.host;
        self.retry
            .execute_with_retry(|| host.save_config(&snapshot), "save_config")
            .await?;
        tracing::info!("Saved configuration to host");
        Ok(())
    }

    pub fn snapshot(&self) -> Configuration {
        self.lock().clone()
    }

    pub fn update<R>(&self, edit: impl FnOnce(&mut Configuration) -> R) -> R {
        edit(&mut self.lock())
    }

    /// Local edit only; call `save` to persist.
    pub fn set_field(&self, key: &str, value: &str) -> Result<(), String> {
        self.update(|config| config.set_field(key, value))
    }

    pub fn disabled_commands(&self) -> BTreeSet<String> {
        self.lock().disabled_commands.clone()
    }
}
