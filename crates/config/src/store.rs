//! The configuration contract shared by every store.
//!
//! Responsibilities:
//! - Define the `Config` trait implemented by the memory, env, and JSON stores.
//! - Provide `Driver` and `open()` for choosing a store at runtime.
//!
//! Invariants:
//! - Values set through `set()` always win over the underlying source.
//! - `get()`, `set()`, and `exists()` never fail; absence is `None`.
//! - Only `load()` (and construction, which calls it) can return an error.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde_json::Value;

use crate::cast::Caster;
use crate::env::EnvConfig;
use crate::error::ConfigError;
use crate::json::JsonConfig;
use crate::memory::MemoryConfig;

/// Uniform access to a configuration source.
///
/// For JSON stores built from several files, keys are prefixed with the
/// file stem: `db.name` reads `name` from `db.json`.
pub trait Config: Send + Sync {
    /// (Re)load the configuration from its source.
    fn load(&self) -> Result<(), ConfigError>;

    /// Set or override the value for `key`.
    fn set(&self, key: &str, value: Value);

    /// Retrieve the value for `key`, or `None` if it is not defined anywhere.
    fn get(&self, key: &str) -> Option<Value>;

    /// Check whether `key` is defined in the overrides or the source.
    fn exists(&self, key: &str) -> bool;

    /// Retrieve the value for `key` wrapped in a `Caster`.
    fn cast(&self, key: &str) -> Caster {
        Caster::new(self.get(key))
    }
}

/// The available store implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Driver {
    #[default]
    Memory,
    Env,
    Json,
}

impl Driver {
    pub const fn as_str(self) -> &'static str {
        match self {
            Driver::Memory => "memory",
            Driver::Env => "env",
            Driver::Json => "json",
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Driver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(Driver::Memory),
            "env" | "dotenv" => Ok(Driver::Env),
            "json" => Ok(Driver::Json),
            other => Err(format!(
                "unknown driver '{other}' (expected memory, env, or json)"
            )),
        }
    }
}

/// Construct a store for `driver` over `files`.
///
/// The memory driver has no files; it starts empty and is populated through
/// `set()`.
pub fn open(driver: Driver, files: Vec<PathBuf>) -> Result<Box<dyn Config>, ConfigError> {
    tracing::debug!(%driver, files = files.len(), "opening config store");
    let store: Box<dyn Config> = match driver {
        Driver::Memory => Box::new(MemoryConfig::default()),
        Driver::Env => Box::new(EnvConfig::new(files)?),
        Driver::Json => Box::new(JsonConfig::new(files)?),
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_parsing() {
        assert_eq!("json".parse::<Driver>().unwrap(), Driver::Json);
        assert_eq!(" ENV ".parse::<Driver>().unwrap(), Driver::Env);
        assert_eq!("dotenv".parse::<Driver>().unwrap(), Driver::Env);
        assert_eq!("mem".parse::<Driver>().unwrap(), Driver::Memory);
        assert!("yaml".parse::<Driver>().is_err());
    }

    #[test]
    fn test_driver_display_round_trips() {
        for driver in [Driver::Memory, Driver::Env, Driver::Json] {
            assert_eq!(driver.to_string().parse::<Driver>().unwrap(), driver);
        }
    }

    #[test]
    fn test_open_memory_starts_empty() {
        let store = open(Driver::Memory, Vec::new()).unwrap();
        assert!(!store.exists("anything"));
        store.set("anything", Value::from(1));
        assert_eq!(store.cast("anything").i64().unwrap(), 1);
    }

    #[test]
    fn test_open_json_without_files_is_empty_document() {
        let store = open(Driver::Json, Vec::new()).unwrap();
        assert_eq!(store.get("app.title"), None);
    }
}
