//! # Script Session
//!
//! The host's script list, the active script and its edit buffer.
//!
//! At most one script is active. The buffer always holds the active script's
//! last loaded or edited code; selecting another script overwrites it without
//! asking. Every mutator is a no-op while nothing is active.

use std::sync::Arc;

use crate::domain::error::{HostError, HostResult};
use crate::domain::traits::Host;
use crate::domain::types::{Script, ScriptId};

pub struct ScriptSession {
    host: Arc<dyn Host>,
    default_name: String,
    scripts: Vec<Script>,
    active: Option<Script>,
    buffer: String,
    /// Code as last loaded from or saved to the host, for `is_dirty`.
    loaded_code: String,
}

impl ScriptSession {
    pub fn new(host: Arc<dyn Host>, default_name: impl Into<String>) -> Self {
        Self {
            host,
            default_name: default_name.into(),
            scripts: Vec::new(),
            active: None,
            buffer: String::new(),
            loaded_code: String::new(),
        }
    }

    pub fn scripts(&self) -> &[Script] {
        &self.scripts
    }

    pub fn active(&self) -> Option<&Script> {
        self.active.as_ref()
    }

    pub fn active_id(&self) -> Option<ScriptId> {
        self.active.as_ref().and_then(|s| s.id)
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Whether the buffer holds edits not yet saved.
    pub fn is_dirty(&self) -> bool {
        self.active.is_some() && self.buffer != self.loaded_code
    }

    /// Fetches the script list. With nothing active the first script with an
    /// id is selected, or the buffer cleared when there is none.
    pub async fn load_scripts(&mut self) -> HostResult {
        self.refresh().await?;

        if self.active.is_some() {
            return Ok(());
        }
        match self.scripts.iter().find_map(|s| s.id) {
            Some(first) => {
                self.select_script(first).await?;
            }
            None => self.clear_buffer(),
        }
        Ok(())
    }

    /// Replaces the list and drops an active script the host no longer has.
    async fn refresh(&mut self) -> HostResult {
        self.scripts = self.host.get_scripts().await?;
        tracing::debug!("Loaded {} scripts", self.scripts.len());

        if let Some(id) = self.active_id() {
            if !self.scripts.iter().any(|s| s.id == Some(id)) {
                tracing::warn!("Active script {} no longer exists on host", id);
                self.active = None;
                self.clear_buffer();
            }
        }
        Ok(())
    }

    /// Makes `id` the active script and loads its code into the buffer.
    /// Nothing changes unless the code is available. Returns `false` when the
    /// id is not in the list.
    pub async fn select_script(&mut self, id: ScriptId) -> HostResult<bool> {
        let Some(script) = self.scripts.iter().find(|s| s.id == Some(id)).cloned() else {
            tracing::warn!("select_script: unknown script {}", id);
            return Ok(false);
        };

        let code = match &script.code {
            Some(code) => code.clone(),
            None => self.host.get_code(id).await?,
        };

        if self.is_dirty() {
            tracing::info!("Discarding unsaved edits to '{}'", self.active_name());
        }
        self.buffer = code.clone();
        self.loaded_code = code.clone();
        self.active = Some(Script {
            code: Some(code),
            ..script
        });
        tracing::debug!("Selected script {}", id);
        Ok(true)
    }

    /// Creates a script under the default name and selects it.
    pub async fn create_script(&mut self) -> HostResult<ScriptId> {
        let created = self.host.add_script(&self.default_name).await?;
        let id = created.id.ok_or_else(|| HostError::Malformed {
            call: "add_script".into(),
            message: "created script has no id".into(),
        })?;
        tracing::info!("Created script {} '{}'", id, created.name);

        self.refresh().await?;
        if !self.select_script(id).await? {
            tracing::warn!("Created script {} missing from host list", id);
        }
        Ok(id)
    }

    /// Deletes the active script and reloads the list, which may select a
    /// new first script. Returns `false` when nothing is active.
    pub async fn delete_script(&mut self) -> HostResult<bool> {
        let Some(active) = &self.active else {
            return Ok(false);
        };
        let Some(id) = active.id else {
            // Never stored on the host; nothing to delete there.
            self.active = None;
            self.clear_buffer();
            return Ok(true);
        };

        if let Err(e) = self.host.delete_script(id).await {
            if !e.is_transient() {
                // Local list likely out of date (already deleted elsewhere).
                if let Err(reload) = self.load_scripts().await {
                    tracing::warn!("Reload after failed delete also failed: {}", reload);
                }
            }
            return Err(e);
        }

        tracing::info!("Deleted script {}", id);
        self.active = None;
        self.clear_buffer();
        self.load_scripts().await?;
        Ok(true)
    }

    /// Local edit of the active script's code. Returns `false` when nothing is active.
    pub fn edit_buffer(&mut self, content: impl Into<String>) -> bool {
        if self.active.is_none() {
            return false;
        }
        self.buffer = content.into();
        true
    }

    /// Persists the active script with the buffer as its code, then reloads
    /// the list. On failure the buffer is kept so the save can be repeated.
    pub async fn save_script(&mut self) -> HostResult<bool> {
        let Some(active) = &self.active else {
            return Ok(false);
        };
        let id = active
            .id
            .ok_or_else(|| HostError::rejected("update_script", "script has no id"))?;

        let script = Script {
            code: Some(self.buffer.clone()),
            ..active.clone()
        };
        self.host.update_script(&script).await?;
        self.host.save_code(id, &self.buffer).await?;

        tracing::info!("Saved script {} '{}'", id, script.name);
        self.loaded_code = self.buffer.clone();
        self.active = Some(script);
        self.load_scripts().await?;
        Ok(true)
    }

    fn active_name(&self) -> &str {
        self.active.as_ref().map(|s| s.name.as_str()).unwrap_or_default()
    }

    fn clear_buffer(&mut self) {
        self.buffer.clear();
        self.loaded_code.clear();
    }
}
