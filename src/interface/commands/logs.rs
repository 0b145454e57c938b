//! # Log Command
//!
//! Handles `.logs [n]`: prints the most recent lines of the log buffer.

use anyhow::Result;

use super::{notify, reply};
use crate::application::session::PanelSession;
use crate::domain::traits::Console;
use crate::strings::messages;

const DEFAULT_LINES: usize = 20;

pub async fn handle_logs(session: &PanelSession, console: &impl Console, args: &str) -> Result<()> {
    let args = args.trim();
    let count = if args.is_empty() {
        DEFAULT_LINES
    } else {
        match args.parse::<usize>() {
            Ok(n) => n,
            Err(_) => return notify(console, messages::LOGS_USAGE).await,
        }
    };

    let (lines, held, capacity) = {
        let logs = session.logs.lock().await;
        if logs.is_empty() {
            drop(logs);
            return reply(console, messages::NO_LOGS).await;
        }
        (logs.tail(count), logs.len(), logs.capacity())
    };

    let mut text: Vec<String> = lines.iter().map(ToString::to_string).collect();
    text.push(messages::log_window(
        lines.len(),
        held,
        capacity,
        session.dropped_records(),
    ));
    reply(console, &text.join("\n")).await
}
