//! In-memory realtime database.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde_json::Value;

use super::error::RealtimeError;
use super::{KeyValueStore, validate_path};

/// Records held in a map keyed by path.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    records: Mutex<BTreeMap<String, Value>>,
    next_key: Mutex<u64>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored record whose path starts with `prefix`.
    pub fn records_under(&self, prefix: &str) -> Vec<(String, Value)> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records
            .iter()
            .filter(|(path, _)| path.starts_with(prefix))
            .map(|(path, value)| (path.clone(), value.clone()))
            .collect()
    }
}

impl KeyValueStore for MemoryDatabase {
    async fn get(&self, path: &str) -> Result<Option<Value>, RealtimeError> {
        let path = validate_path(path)?;
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records.get(path).cloned())
    }

    async fn set(&self, path: &str, value: &Value) -> Result<(), RealtimeError> {
        let path = validate_path(path)?;
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.insert(path.to_string(), value.clone());
        Ok(())
    }

    async fn push(&self, path: &str, value: &Value) -> Result<String, RealtimeError> {
        let path = validate_path(path)?;
        let key = {
            let mut next = self.next_key.lock().unwrap_or_else(|e| e.into_inner());
            *next += 1;
            format!("-M{:08}", *next)
        };

        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.insert(format!("{path}/{key}"), value.clone());
        Ok(key)
    }
}
