//! # Application Layer
//!
//! Contains the panel's state and orchestration on top of the host contract.
//! This includes the process controller, command catalog, script session,
//! log buffer and feed, configuration store, retry policy and command routing.

pub mod command_catalog;
pub mod config_store;
pub mod log_buffer;
pub mod log_feed;
pub mod process;
pub mod retry;
pub mod router;
pub mod script_session;
pub mod session;
