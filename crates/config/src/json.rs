//! JSON-file configuration store.
//!
//! Responsibilities:
//! - Read and validate one or more JSON files on `load()`.
//! - Merge several files into one document keyed by file name minus its
//!   last extension (`db.json` -> `db`, `.json` -> rejected).
//! - Resolve dotted keys against the merged document, below the override map.
//!
//! Does NOT handle:
//! - Writing back to disk. `set()` only touches the override map.
//!
//! Invariants / Assumptions:
//! - Lookup order is overrides (exact key), then the document, then `None`.
//! - Zero files load as `{}`; one file is used as-is; several files are namespaced.
//! - Reload is all-or-nothing: a failed `load()` keeps the previous document.
//! - When two files share a stem, the first one wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::path;
use crate::store::Config;

#[derive(Debug)]
struct JsonState {
    document: Value,
    overrides: HashMap<String, Value>,
}

/// A configuration store backed by JSON files.
#[derive(Debug)]
pub struct JsonConfig {
    files: Vec<PathBuf>,
    state: RwLock<JsonState>,
}

impl JsonConfig {
    /// Create a store over `files`, loading them immediately.
    pub fn new<I, P>(files: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let store = Self {
            files: files.into_iter().map(Into::into).collect(),
            state: RwLock::new(JsonState {
                document: Value::Object(Map::new()),
                overrides: HashMap::new(),
            }),
        };
        store.load()?;
        Ok(store)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Copy of the merged document, without overrides.
    pub fn document(&self) -> Value {
        self.state.read().document.clone()
    }

    /// Snapshot of the values set through `set()`.
    pub fn overrides(&self) -> HashMap<String, Value> {
        self.state.read().overrides.clone()
    }

    fn build_document(&self) -> Result<Value, ConfigError> {
        match self.files.as_slice() {
            [] => Ok(Value::Object(Map::new())),
            [single] => read_document(single),
            many => {
                let mut merged = Map::new();
                for file in many {
                    let namespace = namespace_for(file)?;
                    let document = read_document(file)?;
                    if merged.contains_key(&namespace) {
                        tracing::warn!(
                            path = %file.display(),
                            namespace = %namespace,
                            "duplicate config namespace; keeping the first file"
                        );
                        continue;
                    }
                    merged.insert(namespace, document);
                }
                Ok(Value::Object(merged))
            }
        }
    }
}

fn read_document(path: &Path) -> Result<Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&content).map_err(|e| ConfigError::FileParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// File name with its last extension stripped.
/// The file name up to its last `.`, so `.json` has no namespace at all.
fn namespace_for(path: &Path) -> Result<String, ConfigError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.rsplit_once('.').map_or(name, |(stem, _)| stem))
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::InvalidFileName {
            path: path.to_path_buf(),
        })
}

impl Config for JsonConfig {
    fn load(&self) -> Result<(), ConfigError> {
        let mut state = self.state.write();
        let document = self.build_document()?;
        state.document = document;

        tracing::debug!(files = self.files.len(), "loaded json configuration");
        Ok(())
    }

    fn set(&self, key: &str, value: Value) {
        self.state.write().overrides.insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<Value> {
        let state = self.state.read();
        if let Some(value) = state.overrides.get(key) {
            return Some(value.clone());
        }
        let found = path::lookup(&state.document, key);
        tracing::trace!(key, found = found.is_some(), "json lookup");
        found
    }

    fn exists(&self, key: &str) -> bool {
        let state = self.state.read();
        state.overrides.contains_key(key) || path::lookup(&state.document, key).is_some()
    }
}
