//! # Configuration
//!
//! Two records live here:
//! - `Configuration`: the bot settings owned by the host and edited by the panel.
//! - `PanelConfig`: the panel's own settings, read from `data/panel.yaml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PANEL_CONFIG: &str = "data/panel.yaml";

/// Directory name under the user config dir.
const APP_DIR: &str = "source-cmd-panel";

/// Game log formats the host knows how to parse.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum GameParser {
    #[default]
    #[serde(rename = "Counter Strike 2")]
    CounterStrike2,

    #[serde(rename = "Counter Strike Source")]
    CounterStrikeSource,

    #[serde(rename = "Minecraft")]
    Minecraft,
}

impl GameParser {
    pub const ALL: [GameParser; 3] = [
        GameParser::CounterStrike2,
        GameParser::CounterStrikeSource,
        GameParser::Minecraft,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CounterStrike2 => "Counter Strike 2",
            Self::CounterStrikeSource => "Counter Strike Source",
            Self::Minecraft => "Minecraft",
        }
    }
}

impl fmt::Display for GameParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameParser {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase();
        match wanted.as_str() {
            "cs2" => return Ok(Self::CounterStrike2),
            "css" => return Ok(Self::CounterStrikeSource),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().to_ascii_lowercase() == wanted)
            .ok_or_else(|| format!("unknown parser '{raw}'"))
    }
}

/// Bot configuration. The host holds the authoritative copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Configuration {
    pub file_path: String,
    /// Seconds.
    pub command_timeout: u64,
    pub owner: String,
    pub parser: GameParser,
    pub openai_api_key: String,
    pub disabled_commands: BTreeSet<String>,
    pub response_direction: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            file_path: String::new(),
            command_timeout: 10,
            owner: String::new(),
            parser: GameParser::default(),
            openai_api_key: String::new(),
            disabled_commands: BTreeSet::new(),
            response_direction: String::new(),
        }
    }
}

impl Configuration {
    pub const EDITABLE_FIELDS: [&'static str; 6] = [
        "file_path",
        "command_timeout",
        "owner",
        "parser",
        "openai_api_key",
        "response_direction",
    ];

    /// Sets one scalar field from console input.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "file_path" => self.file_path = value.to_string(),
            "command_timeout" => {
                self.command_timeout = value
                    .trim()
                    .parse()
                    .map_err(|_| format!("command_timeout must be a whole number of seconds, got '{value}'"))?;
            }
            "owner" => self.owner = value.to_string(),
            "parser" => self.parser = value.parse()?,
            "openai_api_key" => self.openai_api_key = value.to_string(),
            "response_direction" => self.response_direction = value.to_string(),
            other => {
                return Err(format!(
                    "unknown field '{other}' (expected one of: {})",
                    Self::EDITABLE_FIELDS.join(", ")
                ));
            }
        }
        Ok(())
    }
}

/// Panel settings, matching the layout of `data/panel.yaml`.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct PanelConfig {
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub scripts: ScriptsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HostConfig {
    #[serde(default = "default_host_command")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// No timeout when absent.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            command: default_host_command(),
            args: Vec::new(),
            request_timeout_secs: None,
        }
    }
}

impl HostConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogsConfig {
    #[serde(default = "default_log_capacity")]
    pub capacity: usize,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_scroll_debounce")]
    pub scroll_debounce_ms: u64,
    #[serde(default = "default_log_file")]
    pub file: String,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            capacity: default_log_capacity(),
            queue_capacity: default_queue_capacity(),
            scroll_debounce_ms: default_scroll_debounce(),
            file: default_log_file(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    #[serde(default = "default_true")]
    pub exponential_backoff: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay(),
            exponential_backoff: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScriptsConfig {
    #[serde(default = "default_script_name")]
    pub default_name: String,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            default_name: default_script_name(),
        }
    }
}

fn default_host_command() -> String {
    "source-cmd-host".to_string()
}
fn default_log_capacity() -> usize {
    1000
}
fn default_queue_capacity() -> usize {
    256
}
fn default_scroll_debounce() -> u64 {
    10
}
fn default_log_file() -> String {
    "data/panel.log".to_string()
}
fn default_max_retries() -> usize {
    3
}
fn default_base_delay() -> u64 {
    250
}
fn default_true() -> bool {
    true
}
fn default_script_name() -> String {
    "New Script".to_string()
}

impl PanelConfig {
    /// Picks the settings file: an explicit path wins, then `data/panel.yaml`,
    /// then `<user config dir>/source-cmd-panel/panel.yaml`. Falls back to
    /// `data/panel.yaml` when none exists.
    pub fn locate(explicit: Option<&Path>) -> PathBuf {
        Self::locate_in(explicit, dirs::config_dir())
    }

    fn locate_in(explicit: Option<&Path>, user_config_dir: Option<PathBuf>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        let local = PathBuf::from(DEFAULT_PANEL_CONFIG);
        if local.exists() {
            return local;
        }
        user_config_dir
            .map(|dir| dir.join(APP_DIR).join("panel.yaml"))
            .filter(|path| path.exists())
            .unwrap_or(local)
    }

    /// Loads the panel settings. A missing file yields defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}
