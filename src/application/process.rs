//! # Process Controller
//!
//! Start/stop/status for the host's bot process. Status changes go through the
//! `ProcessStatus` transition table; a toggle holds an in-flight claim from the
//! pre-toggle host query until the transition settles, and any toggle that
//! arrives meanwhile is ignored.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::application::config_store::ConfigStore;
use crate::domain::error::{HostError, HostResult};
use crate::domain::traits::Host;
use crate::domain::types::{InvalidTransition, ProcessStatus, StatusEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Another toggle was in flight.
    Ignored,
    Started,
    Stopped,
}

#[derive(Debug, Default)]
struct ControllerState {
    status: ProcessStatus,
    claimed: bool,
}

pub struct ProcessController {
    host: Arc<dyn Host>,
    store: Arc<ConfigStore>,
    state: Mutex<ControllerState>,
}

/// Exclusive right to run a toggle. Released on drop; a transition still in
/// flight at that point (the toggle future was cancelled) is reverted.
struct InFlight<'a> {
    controller: &'a ProcessController,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.controller.lock();
        if state.status.is_in_flight() {
            if let Ok(next) = state.status.apply(StatusEvent::Reverted) {
                tracing::warn!(
                    "Toggle abandoned while {}; reverting to {}",
                    state.status,
                    next
                );
                state.status = next;
            }
        }
        state.claimed = false;
    }
}

impl ProcessController {
    pub fn new(host: Arc<dyn Host>, store: Arc<ConfigStore>) -> Self {
        Self {
            host,
            store,
            state: Mutex::new(ControllerState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(|e| {
            tracing::warn!("process state mutex poisoned, recovering");
            e.into_inner()
        })
    }

    pub fn status(&self) -> ProcessStatus {
        self.lock().status
    }

    /// Whether a toggle would currently be accepted.
    pub fn can_toggle(&self) -> bool {
        let state = self.lock();
        !state.claimed && !state.status.is_in_flight()
    }

    fn apply(&self, event: StatusEvent) -> Result<ProcessStatus, InvalidTransition> {
        let mut state = self.lock();
        let next = state.status.apply(event)?;
        if next != state.status {
            tracing::debug!("Process status {} -> {}", state.status, next);
        }
        state.status = next;
        Ok(next)
    }

    fn claim(&self) -> Option<InFlight<'_>> {
        let mut state = self.lock();
        if state.claimed || state.status.is_in_flight() {
            return None;
        }
        state.claimed = true;
        Some(InFlight { controller: self })
    }

    /// Replaces the local status with the host's running state.
    /// A result that lands while a transition is in flight is ignored.
    pub async fn refresh_status(&self) -> HostResult<ProcessStatus> {
        let running = self.host.is_running().await?;
        match self.apply(StatusEvent::Observed(running)) {
            Ok(status) => Ok(status),
            Err(e) => {
                tracing::debug!("Ignoring status refresh: {}", e);
                Ok(self.status())
            }
        }
    }

    /// Starts the process if the host reports it stopped, stops it if running.
    pub async fn toggle(&self) -> HostResult<ToggleOutcome> {
        let Some(_claim) = self.claim() else {
            tracing::debug!("Toggle ignored: transition already in flight");
            return Ok(ToggleOutcome::Ignored);
        };

        // Local status may be stale; the host decides which way to go.
        let running = self.host.is_running().await?;
        self.advance(StatusEvent::Observed(running));

        if running {
            self.advance(StatusEvent::BeginStop);
            tracing::info!("Stopping bot process");
            let result = self.host.stop().await;
            self.settle(result, "stop").await?;
            Ok(ToggleOutcome::Stopped)
        } else {
            self.advance(StatusEvent::BeginStart);
            tracing::info!("Starting bot process");
            let config = self.store.snapshot();
            let result = self.host.start(&config).await;
            self.settle(result, "start").await?;
            Ok(ToggleOutcome::Started)
        }
    }

    /// Applies an event that the claim guarantees is valid.
    fn advance(&self, event: StatusEvent) {
        if let Err(e) = self.apply(event) {
            tracing::error!("Unexpected process transition: {}", e);
        }
    }

    /// Resolves an in-flight transition. On failure the host is asked for the
    /// truth; if that fails too the transition is reverted.
    async fn settle(&self, result: HostResult, call: &str) -> HostResult {
        let error: HostError = match result {
            Ok(()) => {
                self.advance(StatusEvent::Acknowledged);
                return Ok(());
            }
            Err(e) => e,
        };

        tracing::warn!("{} failed: {}", call, error);
        match self.host.is_running().await {
            Ok(running) => self.advance(StatusEvent::Resolved(running)),
            Err(requery) => {
                tracing::warn!("Status re-query failed: {}", requery);
                self.advance(StatusEvent::Reverted);
            }
        }
        Err(error)
    }
}
