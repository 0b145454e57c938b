//! # Host Errors
//!
//! Failure taxonomy for host round-trips. Every call across the host boundary
//! resolves to a `HostError` on failure, split into transient errors (re-invoking
//! the same operation may succeed) and structural ones (it will not).

use std::time::Duration;

pub type HostResult<T = ()> = std::result::Result<T, HostError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// Writing to or reading from the host pipe failed.
    #[error("host transport error: {0}")]
    Transport(String),

    /// The host exited or dropped the reply.
    #[error("host disconnected during `{call}`")]
    Disconnected { call: String },

    #[error("`{call}` timed out after {after:?}")]
    Timeout { call: String, after: Duration },

    /// The host answered with an error reply.
    #[error("host rejected `{call}`: {message}")]
    Rejected { call: String, message: String },

    /// The host answered, but not with the expected shape.
    #[error("malformed reply to `{call}`: {message}")]
    Malformed { call: String, message: String },
}

impl HostError {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Disconnected { .. } | Self::Timeout { .. }
        )
    }

    pub fn rejected(call: &str, message: impl Into<String>) -> Self {
        Self::Rejected {
            call: call.to_string(),
            message: message.into(),
        }
    }

    pub fn disconnected(call: &str) -> Self {
        Self::Disconnected {
            call: call.to_string(),
        }
    }
}
