//! Whole-value key-value store contract.
//!
//! Values are read and written in full; there is no partial-update protocol.

use std::collections::HashMap;
use std::sync::Mutex;

use moodcast_core::error::MoodcastError;

/// Minimal get/set storage used for the trigger log and prompt settings.
pub trait KeyValueStore: Send + Sync {
    /// Read the full value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, MoodcastError>;

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), MoodcastError>;
}

/// In-memory store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, MoodcastError> {
        let values = self
            .values
            .lock()
            .map_err(|e| MoodcastError::Storage(format!("Lock poisoned: {}", e)))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), MoodcastError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| MoodcastError::Storage(format!("Lock poisoned: {}", e)))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
