//! # Process Commands
//!
//! Handles `.status` and `.toggle`.

use anyhow::Result;

use super::{notify, reply};
use crate::application::process::ToggleOutcome;
use crate::application::session::PanelSession;
use crate::domain::traits::Console;
use crate::strings::messages;

pub async fn handle_status(session: &PanelSession, console: &impl Console) -> Result<()> {
    let status = match session.process.refresh_status().await {
        Ok(status) => status,
        Err(e) => {
            notify(console, &messages::host_call_failed("Status query", &e.to_string())).await?;
            session.process.status()
        }
    };
    reply(console, &messages::process_status(status)).await
}

pub async fn handle_toggle(session: &PanelSession, console: &impl Console) -> Result<()> {
    if !session.process.can_toggle() {
        return notify(console, messages::TOGGLE_IGNORED).await;
    }
    match session.process.toggle().await {
        Ok(ToggleOutcome::Ignored) => notify(console, messages::TOGGLE_IGNORED).await,
        Ok(ToggleOutcome::Started) => reply(console, messages::PROCESS_STARTED).await,
        Ok(ToggleOutcome::Stopped) => reply(console, messages::PROCESS_STOPPED).await,
        Err(e) => {
            notify(console, &messages::host_call_failed("Start/stop", &e.to_string())).await?;
            reply(console, &messages::process_status(session.process.status())).await
        }
    }
}
