//! Unified access to configuration values.
//!
//! This crate exposes one contract, [`Config`], over three interchangeable
//! stores: environment variables (optionally seeded from `.env` files), JSON
//! documents, and a plain in-memory map. Every store layers values set at
//! runtime over its source and hands out typed views through [`Caster`].

mod cast;
mod env;
mod error;
mod json;
mod memory;
pub mod path;
mod store;

pub use cast::Caster;
pub use env::{
    DEFAULT_DOTENV_FILE, DOTENV_DISABLED_VAR, EnvConfig, Environment, MapEnv, ProcessEnv,
};
pub use error::{CastError, ConfigError};
pub use json::JsonConfig;
pub use memory::MemoryConfig;
pub use store::{Config, Driver, open};

pub use serde_json::Value;
