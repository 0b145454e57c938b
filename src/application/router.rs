//! # Command Router
//!
//! Routes console input to the appropriate command handler (in `interface/commands`).
//! It parses the command string (e.g., `.toggle`) and dispatches it with the session.

use anyhow::Result;
use std::sync::Arc;

use crate::application::session::PanelSession;
use crate::domain::traits::Console;
use crate::interface::commands;

pub struct CommandRouter {
    session: Arc<PanelSession>,
}

impl CommandRouter {
    pub fn new(session: Arc<PanelSession>) -> Self {
        Self { session }
    }

    pub async fn route<C>(&self, console: &C, message: &str) -> Result<()>
    where
        C: Console,
    {
        let msg = message.trim();
        if msg.is_empty() {
            return Ok(());
        }

        let (cmd, args) = match msg.split_once(char::is_whitespace) {
            Some((cmd, args)) => (cmd, args.trim()),
            None => (msg, ""),
        };
        tracing::debug!("Router dispatching cmd='{}' args='{}'", cmd, args);

        let session = self.session.as_ref();
        match cmd {
            ".help" => commands::help::handle_help(console).await,
            ".status" => commands::process::handle_status(session, console).await,
            ".toggle" => commands::process::handle_toggle(session, console).await,
            ".config" => commands::config::handle_config(session, console, args).await,
            ".save" => commands::config::handle_save(session, console).await,
            ".commands" => commands::bot_commands::handle_list(session, console).await,
            ".enable" => commands::bot_commands::handle_set_enabled(session, console, args, true).await,
            ".disable" => commands::bot_commands::handle_set_enabled(session, console, args, false).await,
            ".scripts" => commands::scripts::handle_list(session, console).await,
            ".select" => commands::scripts::handle_select(session, console, args).await,
            ".new" => commands::scripts::handle_new(session, console).await,
            ".delete" => commands::scripts::handle_delete(session, console).await,
            ".show" => commands::scripts::handle_show(session, console).await,
            ".edit" => commands::scripts::handle_edit(session, console, args).await,
            ".save-script" => commands::scripts::handle_save(session, console).await,
            ".logs" => commands::logs::handle_logs(session, console, args).await,
            _ => {
                tracing::debug!("Unknown command '{}'", cmd);
                commands::notify(console, crate::strings::messages::UNKNOWN_COMMAND).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::PanelConfig;
    use crate::strings::messages;
    use crate::test_utils::{MockHost, RecordingConsole};

    fn router(host: &Arc<MockHost>) -> CommandRouter {
        CommandRouter::new(Arc::new(PanelSession::new(
            host.clone(),
            &PanelConfig::default(),
        )))
    }

    #[tokio::test]
    async fn test_dispatches_commands() {
        let host = MockHost::new().with_commands(&["heal"]).shared();
        let router = router(&host);
        let console = RecordingConsole::default();

        router.route(&console, ".help").await.unwrap();
        router.route(&console, "  .toggle  ").await.unwrap();
        router.route(&console, ".config owner admin").await.unwrap();

        let output = console.output();
        assert!(output.contains(crate::strings::help::MAIN));
        assert!(output.contains(messages::PROCESS_STARTED));
        assert_eq!(host.calls("start"), 1);
        assert!(output.contains("Set `owner`"));
    }

    #[tokio::test]
    async fn test_unknown_and_blank_input() {
        let host = MockHost::new().shared();
        let router = router(&host);
        let console = RecordingConsole::default();

        router.route(&console, "").await.unwrap();
        router.route(&console, ".fly away").await.unwrap();
        router.route(&console, "hello").await.unwrap();

        assert_eq!(
            console.output(),
            format!("{}\n{}", messages::UNKNOWN_COMMAND, messages::UNKNOWN_COMMAND)
        );
        assert!(host.call_log().is_empty());
    }
}
