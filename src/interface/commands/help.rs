//! # Help Command
//!
//! Handles the `.help` command.
//! Displays the main help menu to the user.

use crate::domain::traits::Console;
use anyhow::Result;

pub async fn handle_help(console: &impl Console) -> Result<()> {
    super::reply(console, crate::strings::help::MAIN).await
}
