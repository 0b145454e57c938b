//! # Bot Command Commands
//!
//! Handles `.commands`, `.enable` and `.disable`.

use anyhow::Result;

use super::{notify, reply};
use crate::application::command_catalog::Enablement;
use crate::application::session::PanelSession;
use crate::domain::traits::Console;
use crate::strings::messages;

pub async fn handle_list(session: &PanelSession, console: &impl Console) -> Result<()> {
    let views = session.commands.lock().await.commands();
    reply(console, &messages::command_list(&views)).await
}

pub async fn handle_set_enabled(
    session: &PanelSession,
    console: &impl Console,
    args: &str,
    enabled: bool,
) -> Result<()> {
    let id = args.trim();
    if id.is_empty() {
        let usage = if enabled {
            messages::ENABLE_USAGE
        } else {
            messages::DISABLE_USAGE
        };
        return notify(console, usage).await;
    }

    let result = session.commands.lock().await.set_enabled(id, enabled).await;
    match result {
        Ok(Enablement::Changed) => reply(console, &messages::command_toggled(id, enabled)).await,
        Ok(Enablement::Unchanged) => reply(console, &messages::command_unchanged(id, enabled)).await,
        Ok(Enablement::UnknownCommand) => notify(console, &messages::unknown_bot_command(id)).await,
        Err(e) => notify(console, &messages::host_call_failed("Saving commands", &e.to_string())).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::PanelConfig;
    use crate::test_utils::{MockHost, RecordingConsole};

    #[tokio::test]
    async fn test_disable_and_list() {
        let host = MockHost::new().with_commands(&["kill", "heal"]).shared();
        let session = PanelSession::new(host.clone(), &PanelConfig::default());
        session.bootstrap().await;
        let console = RecordingConsole::default();

        handle_set_enabled(&session, &console, "kill", false).await.unwrap();
        handle_list(&session, &console).await.unwrap();

        let output = console.output();
        assert!(output.contains("Command `kill` disabled."));
        assert!(output.contains("[off] KILL (kill)"));
        assert!(output.contains("[on ] HEAL (heal)"));
        assert_eq!(host.calls("update_disabled_commands"), 1);
    }

    #[tokio::test]
    async fn test_unknown_and_missing_id() {
        let host = MockHost::new().with_commands(&["kill"]).shared();
        let session = PanelSession::new(host.clone(), &PanelConfig::default());
        session.bootstrap().await;
        let console = RecordingConsole::default();

        handle_set_enabled(&session, &console, "fly", true).await.unwrap();
        handle_set_enabled(&session, &console, " ", false).await.unwrap();

        let output = console.output();
        assert!(output.contains("No command `fly`"));
        assert!(output.contains(messages::DISABLE_USAGE));
        assert_eq!(host.calls("update_disabled_commands"), 0);
    }
}
