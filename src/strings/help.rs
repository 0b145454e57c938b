//! # Help Text
//!
//! Help menu for the panel console.
//! Displayed to the user via the `.help` command.

pub const MAIN: &str = concat!(
    "**Source Cmd Panel**\n",
    "Use: .command _args_\n",
    "\n",
    "**Bot process**\n",
    "* status: Show process status\n",
    "* toggle: Start or stop the bot\n",
    "\n",
    "**Configuration**\n",
    "* config: Show configuration\n",
    "* config [key] [value]: Edit a field\n",
    "* save: Save configuration to host\n",
    "\n",
    "**Commands**\n",
    "* commands: List bot commands\n",
    "* enable [id]\n",
    "* disable [id]\n",
    "\n",
    "**Scripts**\n",
    "* scripts: List scripts\n",
    "* select [id]\n",
    "* new: Create a script\n",
    "* delete: Delete the active script\n",
    "* show: Print the edit buffer\n",
    "* edit [file]: Load a file into the edit buffer\n",
    "* save-script\n",
    "\n",
    "**Logs**\n",
    "* logs [n]: Show the last n log lines\n"
);
