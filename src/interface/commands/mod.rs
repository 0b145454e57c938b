//! # Command Handlers
//!
//! Contains specific handler functions for each supported command (e.g., .toggle, .enable, .save-script).
//! These handlers are invoked by the Router.

use anyhow::Result;

use crate::domain::traits::Console;

pub mod bot_commands;
pub mod config;
pub mod help;
pub mod logs;
pub mod process;
pub mod scripts;

pub(crate) async fn reply(console: &impl Console, text: &str) -> Result<()> {
    console.send_message(text).await.map_err(|e| anyhow::anyhow!(e))
}

pub(crate) async fn notify(console: &impl Console, text: &str) -> Result<()> {
    console
        .send_notification(text)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
