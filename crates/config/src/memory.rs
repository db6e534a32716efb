//! In-memory configuration store.
//!
//! Invariants:
//! - `load()` never clears values that were already set.
//! - There is no fallback source; unset keys are `None`.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::ConfigError;
use crate::store::Config;

/// A configuration store backed by a plain key/value map.
#[derive(Debug, Default)]
pub struct MemoryConfig {
    data: RwLock<HashMap<String, Value>>,
}

impl MemoryConfig {
    /// Create a store seeded with `entries`.
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let data = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            data: RwLock::new(data),
        }
    }

    /// Snapshot of every stored entry.
    pub fn entries(&self) -> HashMap<String, Value> {
        self.data.read().clone()
    }
}

impl Config for MemoryConfig {
    fn load(&self) -> Result<(), ConfigError> {
        // Nothing to read; holding the write lock keeps the contract uniform.
        let _data = self.data.write();
        Ok(())
    }

    fn set(&self, key: &str, value: Value) {
        self.data.write().insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.data.read().get(key).cloned()
    }

    fn exists(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }
}
