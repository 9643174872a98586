//! # Workbench Store
//!
//! Large-payload indirection: callers exchange small keys instead of
//! copying large payloads through every stage. The store is append-only
//! within a session - a key is written once and never mutated in place,
//! so the only locking discipline needed is atomic key allocation.

use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::{ToolError, ToolResult};

/// In-memory key → value store, write-once per key
#[derive(Debug, Default)]
pub struct Workbench {
    records: Mutex<HashMap<String, serde_json::Value>>,
}

impl Workbench {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, minting a fresh `wb-<uuid>` key when none is
    /// supplied. Storing to an existing key is rejected - records are
    /// never mutated in place.
    pub fn store(&self, key: Option<String>, value: serde_json::Value) -> ToolResult<String> {
        let key = key.unwrap_or_else(|| format!("wb-{}", Uuid::new_v4()));
        let mut records = self
            .records
            .lock()
            .map_err(|e| ToolError::Application(format!("workbench lock error: {e}")))?;
        if records.contains_key(&key) {
            return Err(ToolError::Application(format!(
                "workbench key already stored: {key}"
            )));
        }
        records.insert(key.clone(), value);
        Ok(key)
    }

    /// Return the value stored under `key`, or `UnknownKey` if it was
    /// never stored
    pub fn retrieve(&self, key: &str) -> ToolResult<serde_json::Value> {
        let records = self
            .records
            .lock()
            .map_err(|e| ToolError::Application(format!("workbench lock error: {e}")))?;
        records
            .get(key)
            .cloned()
            .ok_or_else(|| ToolError::UnknownKey(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
