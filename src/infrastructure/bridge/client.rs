//! Host bridge client.
//!
//! `HostBridge` implements `Host` over a byte stream pair: a child process's
//! stdin/stdout in production, an in-memory duplex in tests. A reader task
//! routes replies to the waiting call by id and pushes log events into a
//! bounded queue. When the stream ends every waiting call resolves to
//! `HostError::Disconnected`, and so does every later call.

use async_trait::async_trait;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::{Value, json};
use std::collections::{BTreeSet, HashMap};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command as ProcessCommand};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

use super::protocol::{self, Inbound, Reply, Request, STDOUT_EVENT};
use crate::domain::config::{Configuration, HostConfig};
use crate::domain::error::{HostError, HostResult};
use crate::domain::traits::Host;
use crate::domain::types::{Command, LogRecord, Script, ScriptId};

type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Reply>>>>;
type Writer = Box<dyn AsyncWrite + Send + Unpin>;

pub struct HostBridge {
    writer: tokio::sync::Mutex<Writer>,
    pending: Pending,
    next_id: AtomicU64,
    connected: Arc<AtomicBool>,
    dropped: Arc<AtomicU64>,
    request_timeout: Option<Duration>,
    /// Killed when the bridge is dropped.
    _child: Mutex<Option<Child>>,
}

struct ReaderState {
    pending: Pending,
    connected: Arc<AtomicBool>,
    dropped: Arc<AtomicU64>,
    records: mpsc::Sender<LogRecord>,
}

/// A call's slot in the pending map, released when the call finishes or is dropped.
struct PendingEntry<'a> {
    pending: &'a Pending,
    id: u64,
}

impl Drop for PendingEntry<'_> {
    fn drop(&mut self) {
        lock_pending(self.pending).remove(&self.id);
    }
}

fn lock_pending(pending: &Pending) -> MutexGuard<'_, HashMap<u64, oneshot::Sender<Reply>>> {
    pending.lock().unwrap_or_else(|e| {
        tracing::warn!("pending map mutex poisoned, recovering");
        e.into_inner()
    })
}

impl HostBridge {
    /// Spawns the host process and connects to its stdin/stdout.
    /// Stderr lines are forwarded to the debug log.
    pub fn spawn(
        config: &HostConfig,
        queue_capacity: usize,
    ) -> anyhow::Result<(Self, mpsc::Receiver<LogRecord>)> {
        tracing::info!("{}", crate::strings::logs::spawning_host(&config.command));
        let mut child = ProcessCommand::new(&config.command)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| anyhow::anyhow!(crate::strings::logs::host_spawn_fail(&e.to_string())))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to capture host stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to capture host stdout"))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                loop {
                    match lines.next_line().await {
                        Ok(Some(line)) if !line.is_empty() => {
                            tracing::debug!(target: "host", "{}", line)
                        }
                        Ok(Some(_)) => {}
                        Ok(None) => break,
                        Err(e) => {
                            tracing::warn!("Error reading host stderr: {}", e);
                            break;
                        }
                    }
                }
            });
        }

        let (mut bridge, records) =
            Self::from_io(stdout, stdin, config.request_timeout(), queue_capacity);
        bridge._child = Mutex::new(Some(child));
        Ok((bridge, records))
    }

    /// Connects over an arbitrary reader/writer pair.
    pub fn from_io<R, W>(
        reader: R,
        writer: W,
        request_timeout: Option<Duration>,
        queue_capacity: usize,
    ) -> (Self, mpsc::Receiver<LogRecord>)
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let (records_tx, records_rx) = mpsc::channel(queue_capacity.max(1));
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let connected = Arc::new(AtomicBool::new(true));
        let dropped = Arc::new(AtomicU64::new(0));

        let state = ReaderState {
            pending: pending.clone(),
            connected: connected.clone(),
            dropped: dropped.clone(),
            records: records_tx,
        };
        tokio::spawn(read_loop(reader, state));

        let bridge = Self {
            writer: tokio::sync::Mutex::new(Box::new(writer)),
            pending,
            next_id: AtomicU64::new(1),
            connected,
            dropped,
            request_timeout,
            _child: Mutex::new(None),
        };
        (bridge, records_rx)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Counts log records discarded because the queue was full.
    pub fn dropped_counter(&self) -> Arc<AtomicU64> {
        self.dropped.clone()
    }

    async fn call<T: DeserializeOwned>(&self, call: &'static str, args: Value) -> HostResult<T> {
        let reply = self.round_trip(call, args).await?;
        if !reply.ok {
            let message = reply.error.unwrap_or_else(|| "no error message".to_string());
            return Err(HostError::rejected(call, message));
        }
        serde_json::from_value(reply.result).map_err(|e| HostError::Malformed {
            call: call.to_string(),
            message: e.to_string(),
        })
    }

    /// For calls whose result carries nothing.
    async fn ack(&self, call: &'static str, args: Value) -> HostResult {
        self.call::<IgnoredAny>(call, args).await.map(|_| ())
    }

    async fn round_trip(&self, call: &'static str, args: Value) -> HostResult<Reply> {
        if !self.is_connected() {
            return Err(HostError::disconnected(call));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        lock_pending(&self.pending).insert(id, tx);
        // Removes the entry on every early return and on cancellation.
        let _entry = PendingEntry {
            pending: &self.pending,
            id,
        };
        // The reader clears `connected` before draining the map.
        if !self.is_connected() {
            return Err(HostError::disconnected(call));
        }

        let line =
            serde_json::to_string(&Request { id, call, args }).map_err(|e| HostError::Malformed {
                call: call.to_string(),
                message: e.to_string(),
            })?;
        tracing::debug!("-> {} #{}", call, id);
        if let Err(e) = self.write_line(&line).await {
            return Err(HostError::Transport(e.to_string()));
        }

        let received = match self.request_timeout {
            Some(after) => match tokio::time::timeout(after, rx).await {
                Ok(received) => received,
                Err(_) => {
                    tracing::warn!("{} #{} timed out after {:?}", call, id, after);
                    return Err(HostError::Timeout {
                        call: call.to_string(),
                        after,
                    });
                }
            },
            None => rx.await,
        };
        received.map_err(|_| HostError::disconnected(call))
    }

    async fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await
    }
}

async fn read_loop<R>(reader: R, state: ReaderState)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => handle_line(&state, &line),
            Ok(None) => {
                tracing::info!("Host closed its output");
                break;
            }
            Err(e) => {
                tracing::warn!("Error reading from host: {}", e);
                break;
            }
        }
    }

    state.connected.store(false, Ordering::SeqCst);
    // Dropping the senders wakes every waiting call with `Disconnected`.
    let abandoned: Vec<_> = lock_pending(&state.pending).drain().collect();
    if !abandoned.is_empty() {
        tracing::warn!("{} host calls abandoned by disconnect", abandoned.len());
    }
}

fn handle_line(state: &ReaderState, line: &str) {
    match protocol::parse_line(line) {
        Some(Inbound::Reply(reply)) => {
            let waiter = lock_pending(&state.pending).remove(&reply.id);
            match waiter {
                Some(tx) => {
                    tracing::debug!("<- #{} ok={}", reply.id, reply.ok);
                    // The caller may have given up; nothing to do then.
                    let _ = tx.send(reply);
                }
                None => tracing::debug!("Reply for unknown request #{}", reply.id),
            }
        }
        Some(Inbound::Event(event)) if event.event == STDOUT_EVENT => {
            match protocol::log_record(event.payload) {
                Ok(record) => push_record(state, record),
                Err(e) => tracing::debug!("Dropping malformed log event: {}", e),
            }
        }
        Some(Inbound::Event(event)) => {
            tracing::debug!("Ignoring unknown host event '{}'", event.event)
        }
        None => {
            if !line.trim().is_empty() {
                tracing::debug!("Dropping malformed host line: {}", line);
            }
        }
    }
}

fn push_record(state: &ReaderState, record: LogRecord) {
    match state.records.try_send(record) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            let count = state.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            if count == 1 || count % 100 == 0 {
                tracing::warn!("{}", crate::strings::logs::dropped_records(count));
            }
        }
        Err(TrySendError::Closed(_)) => {}
    }
}

#[async_trait]
impl Host for HostBridge {
    async fn get_config(&self) -> HostResult<Configuration> {
        self.call("get_config", json!({})).await
    }

    async fn save_config(&self, config: &Configuration) -> HostResult {
        self.ack("save_config", json!({ "config": config })).await
    }

    async fn get_commands(&self) -> HostResult<Vec<Command>> {
        self.call("get_commands", json!({})).await
    }

    async fn update_disabled_commands(&self, disabled: &BTreeSet<String>) -> HostResult {
        self.ack(
            "update_disabled_commands",
            json!({ "disabled_commands": disabled }),
        )
        .await
    }

    async fn is_running(&self) -> HostResult<bool> {
        self.call("is_running", json!({})).await
    }

    async fn start(&self, config: &Configuration) -> HostResult {
        self.ack("start", json!({ "config": config })).await
    }

    async fn stop(&self) -> HostResult {
        self.ack("stop", json!({})).await
    }

    async fn get_scripts(&self) -> HostResult<Vec<Script>> {
        self.call("get_scripts", json!({})).await
    }

    async fn add_script(&self, name: &str) -> HostResult<Script> {
        self.call("add_script", json!({ "script_name": name })).await
    }

    async fn update_script(&self, script: &Script) -> HostResult {
        self.ack("update_script", json!({ "script": script })).await
    }

    async fn save_code(&self, id: ScriptId, code: &str) -> HostResult {
        self.ack("save_code", json!({ "script_id": id, "code": code }))
            .await
    }

    async fn get_code(&self, id: ScriptId) -> HostResult<String> {
        self.call("get_code", json!({ "script_id": id })).await
    }

    async fn delete_script(&self, id: ScriptId) -> HostResult {
        self.ack("delete_script", json!({ "id": id })).await
    }
}
