//! # Log Strings
//!
//! Start-up and shutdown lines written to the tracing log by `main`.

pub fn config_loaded(path: &str) -> String {
    format!("Loaded panel configuration from {path}")
}

pub fn spawning_host(command: &str) -> String {
    format!("Spawning host: {command}")
}

pub fn host_spawn_fail(err: &str) -> String {
    format!("Failed to spawn host: {err}")
}

pub const CONSOLE_READY: &str = "Console ready. Type .help for commands.";

pub const STDIN_CLOSED: &str = "Console input closed";

pub const SHUTDOWN: &str = "Shutting down...";

pub fn shutdown_fail(err: &str) -> String {
    format!("Unable to listen for shutdown signal: {err}")
}

pub fn dropped_records(count: u64) -> String {
    format!("{count} log records dropped while the queue was full")
}
