//! # Main Entry Point
//!
//! Wires the panel together:
//! - Domain: configuration, host contract and types
//! - Infrastructure: host bridge, stdout console
//! - Application: session components, log feed and router
//! - Interface: console command handlers
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

#[cfg(test)]
mod test_utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use crate::application::log_feed::ScrollToLatest;
use crate::application::router::CommandRouter;
use crate::application::session::PanelSession;
use crate::domain::config::{LogsConfig, PanelConfig};
use crate::domain::traits::{Console, Host};
use crate::infrastructure::bridge::HostBridge;
use crate::infrastructure::console::StdoutConsole;
use crate::interface::commands;

#[derive(Parser)]
#[command(name = "source-cmd-panel", version, about = "Control panel for the game chat bot host")]
struct Cli {
    /// Panel settings file (default: data/panel.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Clone, Copy, Default)]
enum Mode {
    /// Interactive console: streams host logs and reads dot-commands from stdin
    #[default]
    Console,
    /// Print the bot process status
    Status,
    /// Start the bot if stopped, stop it if running
    Toggle,
    /// Follow the host log until Ctrl-C
    Logs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load panel settings
    let config_path = PanelConfig::locate(cli.config.as_deref());
    let config = PanelConfig::load(&config_path)?;

    // 2. Logging Setup
    let _guard = init_logging(&config.logs)?;
    tracing::info!(
        "{}",
        strings::logs::config_loaded(&config_path.display().to_string())
    );

    // 3. Connect to the host
    let (bridge, records) = HostBridge::spawn(&config.host, config.logs.queue_capacity)?;
    let dropped = bridge.dropped_counter();
    let host: Arc<dyn Host> = Arc::new(bridge);

    // 4. Session
    let session = Arc::new(PanelSession::new(host, &config).with_dropped_counter(dropped));
    let (feed, scroll) = session.spawn_log_feed(records);
    session.bootstrap().await;

    let console = StdoutConsole::default();
    let result = match cli.mode.unwrap_or_default() {
        Mode::Console => run_console(session, &console, scroll).await,
        Mode::Status => commands::process::handle_status(&session, &console).await,
        Mode::Toggle => commands::process::handle_toggle(&session, &console).await,
        Mode::Logs => follow_logs(&session, &console, scroll).await,
    };

    feed.abort();
    tracing::info!("{}", strings::logs::SHUTDOWN);
    result
}

/// File layer (cleared each run) plus a stderr layer; stdout stays free for
/// console output.
fn init_logging(logs: &LogsConfig) -> Result<WorkerGuard> {
    let log_path = Path::new(&logs.file);
    let dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = log_path
        .file_name()
        .context("Log file path has no file name")?;

    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }
    // Clear previous session log
    if log_path.exists() {
        let _ = fs::remove_file(log_path);
    }

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(guard)
}

/// Prints the buffered log lines after `cursor` and advances it.
async fn print_new_records(
    session: &PanelSession,
    console: &StdoutConsole,
    cursor: &mut u64,
) -> Result<()> {
    let records = session.logs.lock().await.records_since(*cursor);
    if let Some((seq, _)) = records.last() {
        *cursor = *seq;
    }
    console.print_records(&records).await.map_err(anyhow::Error::msg)
}

async fn follow_logs(
    session: &PanelSession,
    console: &StdoutConsole,
    mut scroll: mpsc::Receiver<ScrollToLatest>,
) -> Result<()> {
    let mut cursor = 0;
    print_new_records(session, console, &mut cursor).await?;

    loop {
        tokio::select! {
            notice = scroll.recv() => match notice {
                Some(_) => print_new_records(session, console, &mut cursor).await?,
                None => break,
            },
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    tracing::error!("{}", strings::logs::shutdown_fail(&e.to_string()));
                }
                break;
            }
        }
    }
    Ok(())
}

async fn run_console(
    session: Arc<PanelSession>,
    console: &StdoutConsole,
    mut scroll: mpsc::Receiver<ScrollToLatest>,
) -> Result<()> {
    let router = CommandRouter::new(session.clone());
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut cursor = 0;

    print_new_records(&session, console, &mut cursor).await?;
    console
        .send_message(strings::logs::CONSOLE_READY)
        .await
        .map_err(anyhow::Error::msg)?;

    loop {
        tokio::select! {
            line = input.next_line() => match line {
                Ok(Some(line)) => {
                    if let Err(e) = router.route(console, &line).await {
                        tracing::error!("Command '{}' failed: {:#}", line.trim(), e);
                    }
                }
                Ok(None) => {
                    tracing::info!("{}", strings::logs::STDIN_CLOSED);
                    break;
                }
                Err(e) => {
                    tracing::warn!("Error reading console input: {}", e);
                    break;
                }
            },
            Some(_) = scroll.recv() => {
                print_new_records(&session, console, &mut cursor).await?;
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    tracing::error!("{}", strings::logs::shutdown_fail(&e.to_string()));
                }
                break;
            }
        }
    }
    Ok(())
}
