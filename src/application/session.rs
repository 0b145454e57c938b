//! # Panel Session
//!
//! Owns the five panel components over one shared host connection and runs the
//! start-up sequence: configuration, command catalog, process status, scripts.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::application::command_catalog::CommandCatalog;
use crate::application::config_store::ConfigStore;
use crate::application::log_buffer::LogBuffer;
use crate::application::log_feed::{LogFeed, ScrollToLatest, SharedLogBuffer};
use crate::application::process::ProcessController;
use crate::application::retry::RetryPolicy;
use crate::application::script_session::ScriptSession;
use crate::domain::config::PanelConfig;
use crate::domain::traits::Host;
use crate::domain::types::LogRecord;

/// Scroll notifications waiting for the display.
const SCROLL_QUEUE: usize = 16;

pub struct PanelSession {
    pub config: Arc<ConfigStore>,
    pub process: ProcessController,
    pub commands: Mutex<CommandCatalog>,
    pub scripts: Mutex<ScriptSession>,
    pub logs: SharedLogBuffer,
    scroll_debounce: Duration,
    /// Records the host pushed that never reached the buffer.
    dropped: Arc<AtomicU64>,
}

/// Start-up steps that failed. The session stays usable either way.
#[derive(Debug, Default)]
pub struct BootstrapReport {
    pub failed: Vec<&'static str>,
}

impl BootstrapReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl PanelSession {
    pub fn new(host: Arc<dyn Host>, panel: &PanelConfig) -> Self {
        let retry = RetryPolicy::from_config(&panel.retry);
        let config = Arc::new(ConfigStore::new(host.clone(), retry.clone()));
        Self {
            process: ProcessController::new(host.clone(), config.clone()),
            commands: Mutex::new(CommandCatalog::new(host.clone(), config.clone(), retry)),
            scripts: Mutex::new(ScriptSession::new(host, panel.scripts.default_name.clone())),
            logs: Arc::new(Mutex::new(LogBuffer::with_capacity(panel.logs.capacity))),
            scroll_debounce: Duration::from_millis(panel.logs.scroll_debounce_ms),
            dropped: Arc::new(AtomicU64::new(0)),
            config,
        }
    }

    /// Reports drops counted by the connection feeding the log queue.
    pub fn with_dropped_counter(mut self, dropped: Arc<AtomicU64>) -> Self {
        self.dropped = dropped;
        self
    }

    pub fn dropped_records(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Runs each start-up step in order; a failed step is logged and skipped.
    pub async fn bootstrap(&self) -> BootstrapReport {
        let mut report = BootstrapReport::default();

        if let Err(e) = self.config.load().await {
            tracing::error!("Failed to load configuration: {}", e);
            report.failed.push("config");
        }

        if let Err(e) = self.commands.lock().await.fetch().await {
            tracing::error!("Failed to load command catalog: {}", e);
            report.failed.push("commands");
        }

        match self.process.refresh_status().await {
            Ok(status) => tracing::info!("Bot process is {}", status),
            Err(e) => {
                tracing::error!("Failed to query process status: {}", e);
                report.failed.push("status");
            }
        }

        if let Err(e) = self.scripts.lock().await.load_scripts().await {
            tracing::error!("Failed to load scripts: {}", e);
            report.failed.push("scripts");
        }

        if report.is_complete() {
            tracing::info!("Session ready");
        } else {
            tracing::warn!("Session started with failed steps: {:?}", report.failed);
        }
        report
    }

    /// Starts the single consumer of the host's log queue.
    pub fn spawn_log_feed(
        &self,
        records: mpsc::Receiver<LogRecord>,
    ) -> (JoinHandle<()>, mpsc::Receiver<ScrollToLatest>) {
        let (scroll_tx, scroll_rx) = mpsc::channel(SCROLL_QUEUE);
        let feed = LogFeed::new(self.logs.clone(), self.scroll_debounce);
        (feed.spawn(records, scroll_tx), scroll_rx)
    }
}
