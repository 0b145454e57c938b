//! # Host Bridge
//!
//! Talks to the host process over newline-delimited JSON on its stdin/stdout.
//! Requests carry an id and are answered by a reply with the same id; log lines
//! arrive unsolicited as `stdout_data` events.

pub mod client;
pub mod protocol;

pub use client::HostBridge;
