//! # Interface Layer
//!
//! Console-facing handlers invoked by the command router.

pub mod commands;
