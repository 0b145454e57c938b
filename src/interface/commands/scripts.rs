//! # Script Commands
//!
//! Handles `.scripts`, `.select`, `.new`, `.delete`, `.show`, `.edit` and `.save-script`.
//! Host failures are reported on the console; the session stays as the script
//! module left it.

use anyhow::Result;

use super::{notify, reply};
use crate::application::session::PanelSession;
use crate::domain::traits::Console;
use crate::domain::types::ScriptId;
use crate::strings::messages;

pub async fn handle_list(session: &PanelSession, console: &impl Console) -> Result<()> {
    let mut scripts = session.scripts.lock().await;
    if let Err(e) = scripts.load_scripts().await {
        notify(console, &messages::host_call_failed("Loading scripts", &e.to_string())).await?;
    }
    reply(console, &messages::script_list(scripts.scripts(), scripts.active_id())).await
}

pub async fn handle_select(session: &PanelSession, console: &impl Console, args: &str) -> Result<()> {
    let raw = args.trim();
    let Ok(id) = raw.parse::<ScriptId>() else {
        return notify(console, messages::SELECT_USAGE).await;
    };

    let mut scripts = session.scripts.lock().await;
    match scripts.select_script(id).await {
        Ok(true) => match scripts.active() {
            Some(script) => reply(console, &messages::script_selected(script)).await,
            None => Ok(()),
        },
        Ok(false) => notify(console, &messages::unknown_script(raw)).await,
        Err(e) => notify(console, &messages::host_call_failed("Loading script", &e.to_string())).await,
    }
}

pub async fn handle_new(session: &PanelSession, console: &impl Console) -> Result<()> {
    let result = session.scripts.lock().await.create_script().await;
    match result {
        Ok(id) => reply(console, &messages::script_created(id)).await,
        Err(e) => notify(console, &messages::host_call_failed("Creating script", &e.to_string())).await,
    }
}

pub async fn handle_delete(session: &PanelSession, console: &impl Console) -> Result<()> {
    let result = session.scripts.lock().await.delete_script().await;
    match result {
        Ok(true) => reply(console, messages::SCRIPT_DELETED).await,
        Ok(false) => notify(console, messages::NO_ACTIVE_SCRIPT).await,
        Err(e) => notify(console, &messages::host_call_failed("Deleting script", &e.to_string())).await,
    }
}

pub async fn handle_show(session: &PanelSession, console: &impl Console) -> Result<()> {
    let scripts = session.scripts.lock().await;
    match scripts.active() {
        Some(script) => {
            let text = messages::script_buffer(&script.name, scripts.buffer(), scripts.is_dirty());
            reply(console, &text).await
        }
        None => notify(console, messages::NO_ACTIVE_SCRIPT).await,
    }
}

/// Replaces the edit buffer with a file's contents. Nothing is sent to the host.
pub async fn handle_edit(session: &PanelSession, console: &impl Console, args: &str) -> Result<()> {
    let path = args.trim();
    if path.is_empty() {
        return notify(console, messages::EDIT_USAGE).await;
    }

    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => return notify(console, &messages::file_read_failed(path, &e.to_string())).await,
    };
    let bytes = content.len();
    if session.scripts.lock().await.edit_buffer(content) {
        reply(console, &messages::buffer_loaded(path, bytes)).await
    } else {
        notify(console, messages::NO_ACTIVE_SCRIPT).await
    }
}

pub async fn handle_save(session: &PanelSession, console: &impl Console) -> Result<()> {
    let result = session.scripts.lock().await.save_script().await;
    match result {
        Ok(true) => reply(console, messages::SCRIPT_SAVED).await,
        Ok(false) => notify(console, messages::NO_ACTIVE_SCRIPT).await,
        Err(e) => notify(console, &messages::host_call_failed("Saving script", &e.to_string())).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::PanelConfig;
    use crate::test_utils::{MockHost, RecordingConsole};
    use std::io::Write;

    #[tokio::test]
    async fn test_edit_from_file_then_save() {
        let host = MockHost::new().with_script("greet", "say hi").shared();
        let session = PanelSession::new(host.clone(), &PanelConfig::default());
        session.bootstrap().await;
        let console = RecordingConsole::default();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "say hello world").unwrap();
        let path = file.path().to_string_lossy().to_string();

        handle_edit(&session, &console, &path).await.unwrap();
        handle_show(&session, &console).await.unwrap();
        assert!(console.output().contains("(unsaved)"));

        handle_save(&session, &console).await.unwrap();
        assert_eq!(
            host.script(1).and_then(|s| s.code).as_deref(),
            Some("say hello world")
        );
    }

    #[tokio::test]
    async fn test_new_select_and_list() {
        let host = MockHost::new().with_script("greet", "say hi").shared();
        let session = PanelSession::new(host.clone(), &PanelConfig::default());
        session.bootstrap().await;
        let console = RecordingConsole::default();

        handle_new(&session, &console).await.unwrap();
        handle_select(&session, &console, "1").await.unwrap();
        handle_select(&session, &console, "abc").await.unwrap();
        handle_list(&session, &console).await.unwrap();

        let output = console.output();
        assert!(output.contains("Created script 2."));
        assert!(output.contains("Editing `greet`."));
        assert!(output.contains(messages::SELECT_USAGE));
        assert!(output.contains("> 1: greet"));
        assert!(output.contains("  2: New Script"));
    }

    #[tokio::test]
    async fn test_mutators_without_scripts() {
        let session = PanelSession::new(MockHost::new().shared(), &PanelConfig::default());
        session.bootstrap().await;
        let console = RecordingConsole::default();

        handle_delete(&session, &console).await.unwrap();
        handle_save(&session, &console).await.unwrap();
        handle_show(&session, &console).await.unwrap();

        assert_eq!(
            console.output(),
            [messages::NO_ACTIVE_SCRIPT; 3].join("\n")
        );
    }
}
