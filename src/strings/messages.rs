//! # Messages
//!
//! Constant strings and format functions for console replies.
//! Includes usage hints, outcomes and failure notices.

use crate::domain::config::Configuration;
use crate::domain::types::{CommandView, ProcessStatus, Script, ScriptId};

pub const UNKNOWN_COMMAND: &str = "Unknown command. Type .help for a list.";

pub fn host_call_failed(action: &str, err: &str) -> String {
    format!("{action} failed: {err}")
}

// Process

pub fn process_status(status: ProcessStatus) -> String {
    format!("Bot is **{status}** (control: {})", status.action_label())
}

pub const TOGGLE_IGNORED: &str = "A start/stop is already in progress.";
pub const PROCESS_STARTED: &str = "Bot started.";
pub const PROCESS_STOPPED: &str = "Bot stopped.";

// Configuration

pub fn config_summary(config: &Configuration) -> String {
    let key = if config.openai_api_key.is_empty() {
        "(not set)"
    } else {
        "(set)"
    };
    let disabled: Vec<&str> = config.disabled_commands.iter().map(String::as_str).collect();
    format!(
        "**Configuration**\n\
         * file_path: {}\n\
         * command_timeout: {}s\n\
         * owner: {}\n\
         * parser: {}\n\
         * openai_api_key: {}\n\
         * response_direction: {}\n\
         * disabled_commands: {}",
        config.file_path,
        config.command_timeout,
        config.owner,
        config.parser,
        key,
        config.response_direction,
        if disabled.is_empty() {
            "none".to_string()
        } else {
            disabled.join(", ")
        }
    )
}

pub const CONFIG_USAGE: &str = "Usage: `.config [key value]`";

pub fn config_field_set(key: &str) -> String {
    format!("Set `{key}`. Use `.save` to send it to the host.")
}

pub fn config_field_invalid(err: &str) -> String {
    format!("Invalid value: {err}")
}

pub const CONFIG_SAVED: &str = "Configuration saved.";

// Commands

pub fn command_list(commands: &[CommandView]) -> String {
    if commands.is_empty() {
        return "No commands loaded.".to_string();
    }
    let mut out = String::from("**Commands**\n");
    for command in commands {
        let mark = if command.enabled { "on " } else { "off" };
        out.push_str(&format!(
            "* [{mark}] {} ({}): {}\n",
            command.name, command.id, command.description
        ));
    }
    out.trim_end().to_string()
}

pub const ENABLE_USAGE: &str = "Usage: `.enable <id>`";
pub const DISABLE_USAGE: &str = "Usage: `.disable <id>`";

pub fn command_toggled(id: &str, enabled: bool) -> String {
    let word = if enabled { "enabled" } else { "disabled" };
    format!("Command `{id}` {word}.")
}

pub fn command_unchanged(id: &str, enabled: bool) -> String {
    let word = if enabled { "enabled" } else { "disabled" };
    format!("Command `{id}` is already {word}.")
}

pub fn unknown_bot_command(id: &str) -> String {
    format!("No command `{id}` in the catalog.")
}

// Scripts

pub fn script_list(scripts: &[Script], active: Option<ScriptId>) -> String {
    if scripts.is_empty() {
        return "No scripts. Use `.new` to create one.".to_string();
    }
    let mut out = String::from("**Scripts**\n");
    for script in scripts {
        let marker = if script.id.is_some() && script.id == active { ">" } else { " " };
        let id = script.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into());
        out.push_str(&format!("{marker} {id}: {}\n", script.name));
    }
    out.trim_end().to_string()
}

pub const SELECT_USAGE: &str = "Usage: `.select <id>`";
pub const EDIT_USAGE: &str = "Usage: `.edit <file>`";
pub const NO_ACTIVE_SCRIPT: &str = "No script is active.";

pub fn script_selected(script: &Script) -> String {
    format!("Editing `{}`.", script.name)
}

pub fn unknown_script(id: &str) -> String {
    format!("No script with id `{id}`.")
}

pub fn script_created(id: ScriptId) -> String {
    format!("Created script {id}.")
}

pub const SCRIPT_DELETED: &str = "Script deleted.";
pub const SCRIPT_SAVED: &str = "Script saved.";

pub fn buffer_loaded(path: &str, bytes: usize) -> String {
    format!("Loaded {bytes} bytes from `{path}` into the buffer. Use `.save-script` to keep it.")
}

pub fn file_read_failed(path: &str, err: &str) -> String {
    format!("Could not read `{path}`: {err}")
}

pub fn script_buffer(name: &str, code: &str, dirty: bool) -> String {
    let flag = if dirty { " (unsaved)" } else { "" };
    format!("**{name}**{flag}\n```\n{code}\n```")
}

// Logs

pub const LOGS_USAGE: &str = "Usage: `.logs [n]`";
pub const NO_LOGS: &str = "No log lines yet.";

pub fn log_window(shown: usize, held: usize, capacity: usize, dropped: u64) -> String {
    let mut line = format!("-- {shown} of {held} lines held (keeps {capacity})");
    if dropped > 0 {
        line.push_str(&format!(", {dropped} dropped while the queue was full"));
    }
    line
}
