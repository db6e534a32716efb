//! Command dispatch logic.
//!
//! Responsibilities:
//! - Open the store selected on the command line and apply `--set` overrides.
//! - Route parsed commands to their handlers and write results to the output.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).
//! - Logging setup (see `main()`).
//!
//! Invariants:
//! - Strings are printed raw; every other value is printed as compact JSON.
//! - A missing key is reported through `KeyNotFound`, except by `exists`,
//!   which prints `false` and returns `ExitCode::NotFound`.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use cfgkit::{Config, Driver, EnvConfig, JsonConfig, MemoryConfig, Value};
use serde_json::Map;

use crate::args::{CastTarget, Cli, Commands};
use crate::error::{ExitCode, KeyNotFound};

/// The concrete store behind a CLI invocation.
///
/// `cfgkit::open` erases the store type; `dump` needs the per-store views,
/// so the CLI keeps the concrete type instead.
pub(crate) enum Store {
    Memory(MemoryConfig),
    Env(EnvConfig),
    Json(JsonConfig),
}

impl Store {
    pub(crate) fn open(driver: Driver, files: &[PathBuf]) -> Result<Self> {
        let store = match driver {
            Driver::Memory => {
                if !files.is_empty() {
                    tracing::warn!(files = files.len(), "memory driver ignores source files");
                }
                Store::Memory(MemoryConfig::default())
            }
            Driver::Env => Store::Env(EnvConfig::new(files.iter().cloned())?),
            Driver::Json => Store::Json(JsonConfig::new(files.iter().cloned())?),
        };
        Ok(store)
    }

    fn config(&self) -> &dyn Config {
        match self {
            Store::Memory(store) => store,
            Store::Env(store) => store,
            Store::Json(store) => store,
        }
    }

    /// Everything the store can enumerate.
    ///
    /// The environment is not enumerated, only the overrides layered over it.
    fn dump(&self) -> Value {
        let collect = |entries: std::collections::HashMap<String, Value>| {
            Value::Object(entries.into_iter().collect::<Map<String, Value>>())
        };
        match self {
            Store::Memory(store) => collect(store.entries()),
            Store::Env(store) => collect(store.overrides()),
            Store::Json(store) => {
                let document = store.document();
                let overrides = store.overrides();
                if overrides.is_empty() {
                    document
                } else {
                    serde_json::json!({
                        "document": document,
                        "overrides": collect(overrides),
                    })
                }
            }
        }
    }
}

/// Open the store described by `cli` and run its command.
pub(crate) fn run(cli: Cli, out: &mut impl Write) -> Result<ExitCode> {
    let store = Store::open(cli.driver, &cli.files)
        .with_context(|| format!("failed to open {} store", cli.driver))?;

    for (key, value) in cli.overrides {
        store.config().set(&key, value);
    }

    run_command(cli.command, &store, out)
}

pub(crate) fn run_command(
    command: Commands,
    store: &Store,
    out: &mut impl Write,
) -> Result<ExitCode> {
    let config = store.config();
    match command {
        Commands::Get { key } => {
            let value = config.get(&key).ok_or(KeyNotFound(key))?;
            writeln!(out, "{}", render(&value))?;
        }
        Commands::Exists { key } => {
            let exists = config.exists(&key);
            writeln!(out, "{exists}")?;
            if !exists {
                return Ok(ExitCode::NotFound);
            }
        }
        Commands::Cast { key, target } => {
            if !config.exists(&key) {
                return Err(KeyNotFound(key).into());
            }
            let caster = config.cast(&key);
            let context = || format!("cannot cast '{key}' to {target:?}");
            match target {
                CastTarget::String => writeln!(out, "{}", caster.string().with_context(context)?)?,
                CastTarget::Bool => writeln!(out, "{}", caster.bool().with_context(context)?)?,
                CastTarget::Int => writeln!(out, "{}", caster.i64().with_context(context)?)?,
                CastTarget::Float => writeln!(out, "{}", caster.f64().with_context(context)?)?,
                CastTarget::List => {
                    for item in caster.string_vec().with_context(context)? {
                        writeln!(out, "{item}")?;
                    }
                }
            }
        }
        Commands::Dump => {
            let rendered = serde_json::to_string_pretty(&store.dump())?;
            writeln!(out, "{rendered}")?;
        }
    }
    Ok(ExitCode::Success)
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
