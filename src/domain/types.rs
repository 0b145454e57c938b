//! # Domain Types
//!
//! Records exchanged with the host (commands, scripts, log lines) and the
//! process lifecycle state with its transition table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A bot command as supplied by the host catalog.
/// Enablement is not carried here; see `CommandView`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Command {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Projection of a `Command` against the disabled set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
}

pub type ScriptId = i64;

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Script {
    /// Assigned by the host. `None` until the host has stored the script.
    #[serde(default)]
    pub id: Option<ScriptId>,
    pub name: String,
    /// Loaded lazily; the list call may omit it.
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub trigger: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// One line pushed by the host's logger.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogRecord {
    #[serde(default)]
    pub time_stamp: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub target: String,
    pub message: String,
}

#[cfg(test)]
impl LogRecord {
    pub fn new(level: &str, target: &str, message: &str) -> Self {
        Self {
            time_stamp: String::new(),
            level: level.to_string(),
            target: target.to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} > {}",
            self.time_stamp, self.level, self.target, self.message
        )
    }
}

/// Lifecycle of the host's bot process as seen by the panel.
/// `Starting` and `Stopping` exist only locally while a start/stop is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessStatus {
    #[default]
    Stopped,
    Starting,
    Running,
    Stopping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    /// Host reported its running state outside of a transition.
    Observed(bool),
    BeginStart,
    BeginStop,
    /// Host acknowledged the in-flight start/stop.
    Acknowledged,
    /// Host running state re-queried after a failed transition.
    Resolved(bool),
    /// Transition abandoned without host information.
    Reverted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot apply {event:?} while {from}")]
pub struct InvalidTransition {
    pub from: ProcessStatus,
    pub event: StatusEvent,
}

impl ProcessStatus {
    pub fn from_running(running: bool) -> Self {
        if running { Self::Running } else { Self::Stopped }
    }

    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Starting | Self::Stopping)
    }

    pub fn apply(self, event: StatusEvent) -> Result<Self, InvalidTransition> {
        use ProcessStatus::*;
        use StatusEvent::*;

        let next = match (self, event) {
            (Stopped | Running, Observed(running)) => Self::from_running(running),
            (Stopped, BeginStart) => Starting,
            (Running, BeginStop) => Stopping,
            (Starting, Acknowledged) => Running,
            (Stopping, Acknowledged) => Stopped,
            (Starting | Stopping, Resolved(running)) => Self::from_running(running),
            (Starting, Reverted) => Stopped,
            (Stopping, Reverted) => Running,
            (from, event) => return Err(InvalidTransition { from, event }),
        };
        Ok(next)
    }

    /// Caption for the start/stop control.
    pub fn action_label(self) -> &'static str {
        match self {
            Self::Stopped => "Start",
            Self::Starting => "Starting",
            Self::Running => "Stop",
            Self::Stopping => "Stopping",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Stopped => "Stopped",
            Self::Starting => "Starting",
            Self::Running => "Running",
            Self::Stopping => "Stopping",
        };
        f.write_str(text)
    }
}
