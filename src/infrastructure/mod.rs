//! # Infrastructure Layer
//!
//! Handles interactions with the outside world: the host process and the terminal.
//! Implements the traits defined in the Domain layer (`Host`, `Console`).

pub mod bridge;
pub mod console;
