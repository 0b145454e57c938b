//! # Domain Traits
//!
//! Abstract interfaces for the host process and the console the panel talks to.
//! Allows for pluggable implementations in the Infrastructure layer.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::domain::config::Configuration;
use crate::domain::error::HostResult;
use crate::domain::types::{Command, Script, ScriptId};

/// Request/response boundary to the host process that runs the bot.
#[async_trait]
pub trait Host: Send + Sync {
    async fn get_config(&self) -> HostResult<Configuration>;

    async fn save_config(&self, config: &Configuration) -> HostResult;

    /// Command catalog for the session. Enablement is derived locally.
    async fn get_commands(&self) -> HostResult<Vec<Command>>;

    async fn update_disabled_commands(&self, disabled: &BTreeSet<String>) -> HostResult;

    async fn is_running(&self) -> HostResult<bool>;

    /// Start the bot with the given configuration.
    async fn start(&self, config: &Configuration) -> HostResult;

    async fn stop(&self) -> HostResult;

    async fn get_scripts(&self) -> HostResult<Vec<Script>>;

    /// Create a script with empty code and trigger; returns it with its id.
    async fn add_script(&self, name: &str) -> HostResult<Script>;

    async fn update_script(&self, script: &Script) -> HostResult;

    async fn save_code(&self, id: ScriptId, code: &str) -> HostResult;

    async fn get_code(&self, id: ScriptId) -> HostResult<String>;

    async fn delete_script(&self, id: ScriptId) -> HostResult;
}

/// Where command replies and notices are written.
#[async_trait]
pub trait Console: Send + Sync {
    async fn send_message(&self, content: &str) -> Result<(), String>;

    /// Short status line, e.g. a failure notice.
    async fn send_notification(&self, content: &str) -> Result<(), String>;
}
