//! Environment-variable configuration store.
//!
//! Responsibilities:
//! - Apply `.env` files to the environment on `load()` (later files override earlier ones).
//! - Layer an in-process override map on top of the environment.
//! - Abstract the environment behind `Environment` so tests can use an isolated fake.
//!
//! Does NOT handle:
//! - Writing overrides back to the real environment. `set()` stays in-process.
//!
//! Invariants / Assumptions:
//! - Lookup order is overrides, then environment, then `None`.
//! - Files are staged in order and committed together: `${VAR}` in a later
//!   file sees values from earlier files, and a malformed file never leaves
//!   an earlier file half-applied.
//! - `$VAR` and `${VAR}` resolve against the staged values, then the injected
//!   `Environment`. The host environment is never consulted for a `MapEnv`.
//! - With no files, `.env` in the working directory is loaded if present,
//!   unless `DOTENV_DISABLED` is `true` or `1`.
//! - `ProcessEnv` mutates process-global state shared with every other store
//!   and with any code that reads environment variables directly.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::ConfigError;
use crate::store::Config;

/// File loaded when an `EnvConfig` is built without explicit files.
pub const DEFAULT_DOTENV_FILE: &str = ".env";

/// Variable that disables loading of the default `.env` file.
pub const DOTENV_DISABLED_VAR: &str = "DOTENV_DISABLED";

/// A process-scoped key/value namespace.
pub trait Environment: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;

    fn set_var(&self, key: &str, value: &str);
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    /// Non-UTF-8 values are reported as unset.
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set_var(&self, key: &str, value: &str) {
        // SAFETY: concurrent readers of the environment in other threads may
        // observe the write; loading `.env` files is a process-wide operation.
        unsafe {
            std::env::set_var(key, value);
        }
    }
}

/// An isolated in-memory environment.
#[derive(Debug, Default)]
pub struct MapEnv {
    vars: RwLock<HashMap<String, String>>,
}

impl MapEnv {
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: RwLock::new(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn vars(&self) -> HashMap<String, String> {
        self.vars.read().clone()
    }
}

impl Environment for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.read().get(key).cloned()
    }

    fn set_var(&self, key: &str, value: &str) {
        self.vars.write().insert(key.to_string(), value.to_string());
    }
}

/// A configuration store backed by environment variables.
pub struct EnvConfig<E: Environment = ProcessEnv> {
    files: Vec<PathBuf>,
    env: E,
    overrides: RwLock<HashMap<String, Value>>,
}

impl EnvConfig<ProcessEnv> {
    /// Create a store over the process environment, loading `files` immediately.
    pub fn new<I, P>(files: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::with_environment(ProcessEnv, files)
    }
}

impl<E: Environment> EnvConfig<E> {
    /// Create a store over `env`, loading `files` immediately.
    pub fn with_environment<I, P>(env: E, files: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let store = Self {
            files: files.into_iter().map(Into::into).collect(),
            env,
            overrides: RwLock::new(HashMap::new()),
        };
        store.load()?;
        Ok(store)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    /// Snapshot of the values set through `set()`.
    pub fn overrides(&self) -> HashMap<String, Value> {
        self.overrides.read().clone()
    }

    fn stage_sources(&self) -> Result<Staged, ConfigError> {
        let mut staged = Staged::default();
        if self.files.is_empty() {
            self.stage_default_file(&mut staged)?;
            return Ok(staged);
        }

        for file in &self.files {
            staged.read_file(file, &self.env)?;
        }
        Ok(staged)
    }

    fn stage_default_file(&self, staged: &mut Staged) -> Result<(), ConfigError> {
        if self.dotenv_disabled() {
            return Ok(());
        }

        match staged.read_file(Path::new(DEFAULT_DOTENV_FILE), &self.env) {
            Err(ConfigError::DotenvIo {
                kind: ErrorKind::NotFound,
                ..
            }) => Ok(()),
            other => other,
        }
    }

    fn dotenv_disabled(&self) -> bool {
        matches!(
            self.env.var(DOTENV_DISABLED_VAR).as_deref(),
            Some("true") | Some("1")
        )
    }
}

/// Stand-in for a `$` that starts a substitution.
///
/// dotenvy resolves `$VAR` against the process environment itself, so
/// substitutions are hidden from it and expanded here instead.
const SUBSTITUTION_MARK: char = '\u{E000}';

/// Variables read during one `load()`, not yet written to the environment.
#[derive(Default)]
struct Staged {
    vars: HashMap<String, String>,
}

impl Staged {
    fn read_file<E: Environment>(&mut self, path: &Path, env: &E) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::from_dotenv(path.to_path_buf(), dotenvy::Error::Io(e)))?;
        let marked = mark_substitutions(&content);

        for item in dotenvy::from_read_iter(marked.as_bytes()) {
            let (key, raw) =
                item.map_err(|e| ConfigError::from_dotenv(path.to_path_buf(), e))?;
            let value = expand_substitutions(&raw, |name| {
                self.vars.get(name).cloned().or_else(|| env.var(name))
            })
            .map_err(|error_index| ConfigError::DotenvParse {
                path: path.to_path_buf(),
                error_index,
            })?;
            self.vars.insert(key, value);
        }
        Ok(())
    }
}

/// Replace every `$` that would start a substitution with `SUBSTITUTION_MARK`.
///
/// Follows dotenv quoting: single quotes and `\$` keep a literal `$`, comment
/// lines and trailing comments are left alone. Character positions are
/// preserved so parse errors still point at the right column.
fn mark_substitutions(content: &str) -> String {
    let mut marked = String::with_capacity(content.len());
    let mut line_start = true;
    let mut skip = false;
    let mut in_value = false;
    let mut started = false;
    let (mut strong, mut weak, mut escaped) = (false, false, false);

    for c in content.chars() {
        if c == '\n' && !strong && !weak {
            line_start = true;
            skip = false;
            in_value = false;
            started = false;
            escaped = false;
            marked.push(c);
            continue;
        }
        if line_start && !c.is_whitespace() {
            line_start = false;
            skip = c == '#';
        }
        if skip || !in_value {
            in_value = !skip && c == '=';
            marked.push(c);
            continue;
        }

        if escaped {
            escaped = false;
        } else if strong {
            strong = c != '\'';
        } else {
            let blank = c == ' ' || c == '\t';
            if blank && started && !weak {
                skip = true;
            }
            started |= !blank;
            match c {
                '$' => {
                    marked.push(SUBSTITUTION_MARK);
                    continue;
                }
                '\\' => escaped = true,
                '"' => weak = !weak,
                '\'' if !weak => strong = true,
                _ => {}
            }
        }
        marked.push(c);
    }
    marked
}

/// Expand marked substitutions in a parsed value. Unset names expand to "".
///
/// Returns the character index of an unterminated `${` on failure.
fn expand_substitutions(
    value: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, usize> {
    let mut expanded = String::with_capacity(value.len());
    let mut chars = value.chars().enumerate().peekable();

    while let Some((index, c)) = chars.next() {
        if c != SUBSTITUTION_MARK {
            expanded.push(c);
            continue;
        }

        let mut name = String::new();
        if chars.next_if(|&(_, c)| c == '{').is_some() {
            loop {
                match chars.next() {
                    Some((_, '}')) => break,
                    Some((_, c)) => name.push(c),
                    None => return Err(index),
                }
            }
        } else {
            while let Some((_, c)) = chars.next_if(|&(_, c)| c.is_alphanumeric() || c == '_') {
                name.push(c);
            }
        }

        if name.is_empty() {
            continue;
        }
        if let Some(found) = lookup(&name) {
            expanded.push_str(&found);
        }
    }
    Ok(expanded)
}

impl<E: Environment> Config for EnvConfig<E> {
    fn load(&self) -> Result<(), ConfigError> {
        let _overrides = self.overrides.write();

        let staged = self.stage_sources()?;
        let count = staged.vars.len();
        for (key, value) in &staged.vars {
            self.env.set_var(key, value);
        }

        tracing::debug!(
            files = self.files.len(),
            variables = count,
            "loaded env configuration"
        );
        Ok(())
    }

    fn set(&self, key: &str, value: Value) {
        self.overrides.write().insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<Value> {
        let overrides = self.overrides.read();
        if let Some(value) = overrides.get(key) {
            return Some(value.clone());
        }
        self.env.var(key).map(Value::String)
    }

    fn exists(&self, key: &str) -> bool {
        let overrides = self.overrides.read();
        overrides.contains_key(key) || self.env.var(key).is_some()
    }
}

impl<E: Environment> std::fmt::Debug for EnvConfig<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Environment values can be secrets; only report their shape.
        f.debug_struct("EnvConfig")
            .field("files", &self.files)
            .field("overrides", &self.overrides.read().len())
            .finish_non_exhaustive()
    }
}
