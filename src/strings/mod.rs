//! # Strings Module
//!
//! Centralizes user-facing strings and help text.
//! Keeps console wording in one place, away from the handlers.

pub mod help;
pub mod logs;
pub mod messages;
