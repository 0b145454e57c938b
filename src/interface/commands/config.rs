//! # Configuration Commands
//!
//! Handles `.config` (show or edit one field) and `.save`.

use anyhow::Result;

use super::{notify, reply};
use crate::application::session::PanelSession;
use crate::domain::traits::Console;
use crate::strings::messages;

pub async fn handle_config(session: &PanelSession, console: &impl Console, args: &str) -> Result<()> {
    let args = args.trim();
    if args.is_empty() {
        return reply(console, &messages::config_summary(&session.config.snapshot())).await;
    }

    let Some((key, value)) = args.split_once(char::is_whitespace) else {
        return notify(console, messages::CONFIG_USAGE).await;
    };
    match session.config.set_field(key, value.trim()) {
        Ok(()) => reply(console, &messages::config_field_set(key)).await,
        Err(e) => notify(console, &messages::config_field_invalid(&e)).await,
    }
}

pub async fn handle_save(session: &PanelSession, console: &impl Console) -> Result<()> {
    match session.config.save().await {
        Ok(()) => reply(console, messages::CONFIG_SAVED).await,
        Err(e) => notify(console, &messages::host_call_failed("Save", &e.to_string())).await,
    }
}
