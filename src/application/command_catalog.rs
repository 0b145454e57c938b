//! # Command Catalog
//!
//! The host's bot commands and their enablement. Enablement is never stored: it is
//! projected from the catalog and the configuration's disabled set on every read,
//! so the two cannot drift apart.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::application::config_store::ConfigStore;
use crate::application::retry::RetryPolicy;
use crate::domain::error::HostResult;
use crate::domain::traits::Host;
use crate::domain::types::{Command, CommandView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enablement {
    /// Disabled set changed and was persisted.
    Changed,
    /// Command already had the requested state; nothing sent.
    Unchanged,
    UnknownCommand,
}

/// Enabled flag for each command: `!(id ∈ disabled)`.
pub fn project(catalog: &[Command], disabled: &BTreeSet<String>) -> Vec<CommandView> {
    catalog
        .iter()
        .map(|command| CommandView {
            id: command.id.clone(),
            name: command.name.clone(),
            description: command.description.clone(),
            enabled: !disabled.contains(&command.id),
        })
        .collect()
}

pub struct CommandCatalog {
    host: Arc<dyn Host>,
    store: Arc<ConfigStore>,
    retry: RetryPolicy,
    catalog: Vec<Command>,
}

impl CommandCatalog {
    pub fn new(host: Arc<dyn Host>, store: Arc<ConfigStore>, retry: RetryPolicy) -> Self {
        Self {
            host,
            store,
            retry,
            catalog: Vec::new(),
        }
    }

    /// Fetches the catalog and loads it against the store's current disabled set.
    pub async fn fetch(&mut self) -> HostResult {
        let catalog = self.host.get_commands().await?;
        let disabled = self.store.disabled_commands();
        self.load(catalog, disabled);
        Ok(())
    }

    /// Installs a catalog and disabled set. Identifiers in `disabled` that the
    /// catalog does not know are dropped so the disabled set stays a subset of it.
    pub fn load(&mut self, catalog: Vec<Command>, disabled: BTreeSet<String>) {
        let known: BTreeSet<&str> = catalog.iter().map(|c| c.id.as_str()).collect();
        let (kept, unknown): (BTreeSet<String>, BTreeSet<String>) = disabled
            .into_iter()
            .partition(|id| known.contains(id.as_str()));

        if !unknown.is_empty() {
            tracing::warn!(
                "Ignoring disabled commands missing from the catalog: {:?}",
                unknown
            );
        }

        self.store.update(|config| config.disabled_commands = kept);
        self.catalog = catalog;
        tracing::debug!("Loaded {} commands", self.catalog.len());
    }

    pub fn commands(&self) -> Vec<CommandView> {
        project(&self.catalog, &self.store.disabled_commands())
    }

    #[cfg(test)]
    pub fn is_enabled(&self, id: &str) -> Option<bool> {
        self.commands()
            .into_iter()
            .find(|view| view.id == id)
            .map(|view| view.enabled)
    }

    /// Enables or disables a command. Only a change in membership is persisted;
    /// if persisting fails the local change is undone so the call can be repeated.
    pub async fn set_enabled(&mut self, id: &str, enabled: bool) -> HostResult<Enablement> {
        if !self.catalog.iter().any(|command| command.id == id) {
            tracing::warn!("set_enabled: unknown command '{}'", id);
            return Ok(Enablement::UnknownCommand);
        }

        let changed = self.store.update(|config| apply(&mut config.disabled_commands, id, enabled));
        if !changed {
            tracing::debug!("Command '{}' already {}", id, state_word(enabled));
            return Ok(Enablement::Unchanged);
        }

        if let Err(e) = self.persist().await {
            self.store
                .update(|config| apply(&mut config.disabled_commands, id, !enabled));
            tracing::warn!(
                "Reverted '{}' to {} after failed save: {}",
                id,
                state_word(!enabled),
                e
            );
            return Err(e);
        }

        tracing::info!("Command '{}' {}", id, state_word(enabled));
        Ok(Enablement::Changed)
    }

    async fn persist(&self) -> HostResult {
        let disabled = self.store.disabled_commands();
        let host = &self.host;
        self.retry
            .execute_with_retry(
                || host.update_disabled_commands(&disabled),
                "update_disabled_commands",
            )
            .await?;
        self.store.save().await
    }
}

/// Returns whether membership changed.
fn apply(disabled: &mut BTreeSet<String>, id: &str, enabled: bool) -> bool {
    if enabled {
        disabled.remove(id)
    } else {
        disabled.insert(id.to_string())
    }
}

fn state_word(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}
