//! # Stdout Console
//!
//! Implements the `Console` trait on the process's stdout. Stdout carries only
//! console output; diagnostics go through `tracing` to stderr and the log file.

use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

use crate::domain::traits::Console;
use crate::domain::types::LogRecord;

pub struct StdoutConsole {
    out: Mutex<Stdout>,
}

impl Default for StdoutConsole {
    fn default() -> Self {
        Self {
            out: Mutex::new(tokio::io::stdout()),
        }
    }
}

impl StdoutConsole {
    async fn write(&self, text: &str) -> Result<(), String> {
        let mut out = self.out.lock().await;
        out.write_all(text.as_bytes())
            .await
            .map_err(|e| e.to_string())?;
        out.write_all(b"\n").await.map_err(|e| e.to_string())?;
        out.flush().await.map_err(|e| e.to_string())
    }

    /// Prints host log lines, one per record.
    pub async fn print_records(&self, records: &[(u64, LogRecord)]) -> Result<(), String> {
        if records.is_empty() {
            return Ok(());
        }
        let text = records
            .iter()
            .map(|(_, record)| record.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        self.write(&text).await
    }
}

#[async_trait]
impl Console for StdoutConsole {
    async fn send_message(&self, content: &str) -> Result<(), String> {
        self.write(content).await
    }

    async fn send_notification(&self, content: &str) -> Result<(), String> {
        self.write(&format!("! {content}")).await
    }
}
