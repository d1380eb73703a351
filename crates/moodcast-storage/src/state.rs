//! Typed persistence for prompt state.
//!
//! The trigger log and prompt settings are each stored as one JSON value
//! under a fixed key.

use std::sync::Arc;

use tracing::debug;

use moodcast_core::error::MoodcastError;
use moodcast_core::types::{PromptSettings, TriggerLog};

use crate::kv::KeyValueStore;

pub const TRIGGER_LOG_KEY: &str = "trigger_log";
pub const PROMPT_SETTINGS_KEY: &str = "prompt_settings";

/// Repository for the trigger log and prompt settings.
#[derive(Clone)]
pub struct PromptStateRepository {
    store: Arc<dyn KeyValueStore>,
}

impl PromptStateRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the trigger log. A missing value is an empty log.
    pub fn load_log(&self) -> Result<TriggerLog, MoodcastError> {
        match self.store.get(TRIGGER_LOG_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(TriggerLog::default()),
        }
    }

    /// Replace the stored trigger log.
    pub fn save_log(&self, log: &TriggerLog) -> Result<(), MoodcastError> {
        let raw = serde_json::to_string(log)?;
        self.store.set(TRIGGER_LOG_KEY, &raw)?;
        debug!(entries = log.len(), "Trigger log saved");
        Ok(())
    }

    /// Load stored settings, or `None` if the user never saved any.
    pub fn load_settings(&self) -> Result<Option<PromptSettings>, MoodcastError> {
        match self.store.get(PROMPT_SETTINGS_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Load stored settings, seeding `defaults` into storage on first use.
    pub fn load_settings_or_seed(
        &self,
        defaults: &PromptSettings,
    ) -> Result<PromptSettings, MoodcastError> {
        match self.load_settings()? {
            Some(settings) => Ok(settings),
            None => {
                self.save_settings(defaults)?;
                Ok(defaults.clone())
            }
        }
    }

    /// Validate and replace the stored settings.
    pub fn save_settings(&self, settings: &PromptSettings) -> Result<(), MoodcastError> {
        settings.validate()?;
        let raw = serde_json::to_string(settings)?;
        self.store.set(PROMPT_SETTINGS_KEY, &raw)
    }
}

impl std::fmt::Debug for PromptStateRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptStateRepository").finish()
    }
}
