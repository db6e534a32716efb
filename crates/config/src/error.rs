//! Error types for configuration stores.
//!
//! Responsibilities:
//! - Define `ConfigError` for every failure a store's `load()` can report.
//! - Define `CastError` for typed conversions performed by `Caster`.
//!
//! Does NOT handle:
//! - Absence of a key. A missing key is `None`, never an error.
//!
//! Invariants:
//! - Every load error names the file that caused it.
//! - Dotenv errors NEVER include raw .env line contents to prevent secret leakage.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a configuration source.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in config file at {path}: {source}")]
    FileParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Config file name at {path} cannot be used as a namespace")]
    InvalidFileName { path: PathBuf },

    /// Failed to parse a `.env` file due to invalid syntax.
    ///
    /// SAFETY: This error only includes the byte index of the parse failure,
    /// NOT the offending line content, to prevent leaking secrets.
    #[error("Failed to parse .env file at {path} (position {error_index})")]
    DotenvParse { path: PathBuf, error_index: usize },

    /// Failed to read a `.env` file due to an I/O error.
    #[error("Failed to read .env file at {path}: {kind}")]
    DotenvIo { path: PathBuf, kind: ErrorKind },

    /// Unknown dotenv error (future variants from dotenvy crate).
    #[error("Failed to load .env file at {path}")]
    DotenvUnknown { path: PathBuf },
}

impl ConfigError {
    /// Path of the file that caused the failure.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ConfigError::FileRead { path, .. }
            | ConfigError::FileParse { path, .. }
            | ConfigError::InvalidFileName { path }
            | ConfigError::DotenvParse { path, .. }
            | ConfigError::DotenvIo { path, .. }
            | ConfigError::DotenvUnknown { path } => path,
        }
    }

    pub(crate) fn from_dotenv(path: PathBuf, err: dotenvy::Error) -> Self {
        match err {
            dotenvy::Error::LineParse(_, error_index) => {
                ConfigError::DotenvParse { path, error_index }
            }
            dotenvy::Error::Io(io_err) => ConfigError::DotenvIo {
                path,
                kind: io_err.kind(),
            },
            _ => ConfigError::DotenvUnknown { path },
        }
    }
}

/// Errors returned by `Caster` accessors when a value cannot be converted.
#[derive(Error, Debug)]
pub enum CastError {
    #[error("value is missing")]
    Missing,

    #[error("cannot cast {found} to {expected}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot parse {input:?} as {expected}")]
    Parse {
        expected: &'static str,
        input: String,
    },

    #[error("{value} is out of range for {expected}")]
    OutOfRange {
        expected: &'static str,
        value: String,
    },

    #[error("cannot deserialize value: {0}")]
    Deserialize(#[from] serde_json::Error),
}
