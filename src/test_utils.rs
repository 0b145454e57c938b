//! In-memory host used by unit tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::domain::config::Configuration;
use crate::domain::error::{HostError, HostResult};
use crate::domain::traits::{Console, Host};
use crate::domain::types::{Command, Script, ScriptId};

#[derive(Default)]
struct MockState {
    config: Configuration,
    host_disabled: BTreeSet<String>,
    commands: Vec<Command>,
    scripts: BTreeMap<ScriptId, Script>,
    /// Listed ahead of `scripts`, with no id.
    unnumbered: Vec<Script>,
    next_id: ScriptId,
    running: bool,
    calls: Vec<&'static str>,
    failures: HashMap<&'static str, VecDeque<Option<HostError>>>,
    omit_code_in_list: bool,
    hold_transitions: bool,
}

#[derive(Default)]
pub struct MockHost {
    state: Mutex<MockState>,
    release: Notify,
}

impl MockHost {
    pub fn new() -> Self {
        let host = Self::default();
        host.state().next_id = 1;
        host
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn with_commands(self, ids: &[&str]) -> Self {
        self.state().commands = ids
            .iter()
            .map(|id| Command {
                id: id.to_string(),
                name: id.to_uppercase(),
                description: format!("{id} command"),
            })
            .collect();
        self
    }

    pub fn with_config(self, config: Configuration) -> Self {
        {
            let mut state = self.state();
            state.host_disabled = config.disabled_commands.clone();
            state.config = config;
        }
        self
    }

    pub fn with_script(self, name: &str, code: &str) -> Self {
        {
            let mut state = self.state();
            let id = state.next_id;
            state.next_id += 1;
            state.scripts.insert(
                id,
                Script {
                    id: Some(id),
                    name: name.to_string(),
                    code: Some(code.to_string()),
                    trigger: String::new(),
                    enabled: true,
                },
            );
        }
        self
    }

    /// A listed script the host has not assigned an id to.
    pub fn with_unnumbered_script(self, name: &str) -> Self {
        self.state().unnumbered.push(Script {
            id: None,
            name: name.to_string(),
            code: Some(String::new()),
            trigger: String::new(),
            enabled: true,
        });
        self
    }

    pub fn running(self, running: bool) -> Self {
        self.state().running = running;
        self
    }

    /// List calls leave out script code, forcing a `get_code` round-trip.
    pub fn omit_code_in_list(self) -> Self {
        self.state().omit_code_in_list = true;
        self
    }

    /// Holds `start`/`stop` until `release_transition` is called.
    pub fn hold_transitions(self) -> Self {
        self.state().hold_transitions = true;
        self
    }

    pub fn release_transition(&self) {
        self.release.notify_one();
    }

    pub fn set_running(&self, running: bool) {
        self.state().running = running;
    }

    pub fn fail_next(&self, call: &'static str, error: HostError) {
        self.state()
            .failures
            .entry(call)
            .or_default()
            .push_back(Some(error));
    }

    /// Lets the next `call` succeed ahead of any queued failure.
    pub fn pass_next(&self, call: &'static str) {
        self.state().failures.entry(call).or_default().push_back(None);
    }

    pub fn calls(&self, call: &str) -> usize {
        self.state().calls.iter().filter(|c| **c == call).count()
    }

    pub fn call_log(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }

    pub fn saved_config(&self) -> Configuration {
        self.state().config.clone()
    }

    pub fn host_disabled(&self) -> BTreeSet<String> {
        self.state().host_disabled.clone()
    }

    pub fn script(&self, id: ScriptId) -> Option<Script> {
        self.state().scripts.get(&id).cloned()
    }

    pub fn is_running_now(&self) -> bool {
        self.state().running
    }

    fn enter(&self, call: &'static str) -> HostResult {
        let mut state = self.state();
        state.calls.push(call);
        match state.failures.get_mut(call).and_then(VecDeque::pop_front) {
            Some(Some(err)) => Err(err),
            _ => Ok(()),
        }
    }

    async fn wait_if_held(&self) {
        let held = self.state().hold_transitions;
        if held {
            self.release.notified().await;
        }
    }
}

#[async_trait]
impl Host for MockHost {
    async fn get_config(&self) -> HostResult<Configuration> {
        self.enter("get_config")?;
        Ok(self.state().config.clone())
    }

    async fn save_config(&self, config: &Configuration) -> HostResult {
        self.enter("save_config")?;
        self.state().config = config.clone();
        Ok(())
    }

    async fn get_commands(&self) -> HostResult<Vec<Command>> {
        self.enter("get_commands")?;
        Ok(self.state().commands.clone())
    }

    async fn update_disabled_commands(&self, disabled: &BTreeSet<String>) -> HostResult {
        self.enter("update_disabled_commands")?;
        self.state().host_disabled = disabled.clone();
        Ok(())
    }

    async fn is_running(&self) -> HostResult<bool> {
        self.enter("is_running")?;
        Ok(self.state().running)
    }

    async fn start(&self, _config: &Configuration) -> HostResult {
        self.enter("start")?;
        self.wait_if_held().await;
        self.state().running = true;
        Ok(())
    }

    async fn stop(&self) -> HostResult {
        self.enter("stop")?;
        self.wait_if_held().await;
        self.state().running = false;
        Ok(())
    }

    async fn get_scripts(&self) -> HostResult<Vec<Script>> {
        self.enter("get_scripts")?;
        let state = self.state();
        Ok(state
            .unnumbered
            .iter()
            .chain(state.scripts.values())
            .cloned()
            .map(|mut s| {
                if state.omit_code_in_list {
                    s.code = None;
                }
                s
            })
            .collect())
    }

    async fn add_script(&self, name: &str) -> HostResult<Script> {
        self.enter("add_script")?;
        let mut state = self.state();
        let id = state.next_id;
        state.next_id += 1;
        let script = Script {
            id: Some(id),
            name: name.to_string(),
            code: Some(String::new()),
            trigger: String::new(),
            enabled: true,
        };
        state.scripts.insert(id, script.clone());
        Ok(script)
    }

    async fn update_script(&self, script: &Script) -> HostResult {
        self.enter("update_script")?;
        let id = script
            .id
            .ok_or_else(|| HostError::rejected("update_script", "script has no id"))?;
        let mut state = self.state();
        match state.scripts.get_mut(&id) {
            Some(stored) => {
                *stored = script.clone();
                Ok(())
            }
            None => Err(HostError::rejected("update_script", "no such script")),
        }
    }

    async fn save_code(&self, id: ScriptId, code: &str) -> HostResult {
        self.enter("save_code")?;
        let mut state = self.state();
        match state.scripts.get_mut(&id) {
            Some(stored) => {
                stored.code = Some(code.to_string());
                Ok(())
            }
            None => Err(HostError::rejected("save_code", "no such script")),
        }
    }

    async fn get_code(&self, id: ScriptId) -> HostResult<String> {
        self.enter("get_code")?;
        self.state()
            .scripts
            .get(&id)
            .map(|s| s.code.clone().unwrap_or_default())
            .ok_or_else(|| HostError::rejected("get_code", "no such script"))
    }

    async fn delete_script(&self, id: ScriptId) -> HostResult {
        self.enter("delete_script")?;
        match self.state().scripts.remove(&id) {
            Some(_) => Ok(()),
            None => Err(HostError::rejected("delete_script", "no such script")),
        }
    }
}

/// Console that keeps everything written to it.
#[derive(Default)]
pub struct RecordingConsole {
    lines: Mutex<Vec<String>>,
}

impl RecordingConsole {
    pub fn output(&self) -> String {
        self.lines.lock().unwrap().join("\n")
    }
}

#[async_trait]
impl Console for RecordingConsole {
    async fn send_message(&self, content: &str) -> Result<(), String> {
        self.lines.lock().unwrap().push(content.to_string());
        Ok(())
    }

    async fn send_notification(&self, content: &str) -> Result<(), String> {
        self.lines.lock().unwrap().push(content.to_string());
        Ok(())
    }
}
