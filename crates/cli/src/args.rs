//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse `--set KEY=VALUE` overrides into JSON values.
//!
//! Non-responsibilities:
//! - Does not open stores or execute commands (see `dispatch` module).

use cfgkit::{Driver, Value};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cfgkit")]
#[command(about = "Inspect configuration from env files, JSON files, or inline values", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  cfgkit -d json -f app.json -f db.json get db.name\n  cfgkit -d env -f .env cast PORT --as int\n  cfgkit -d memory --set debug=true exists debug\n  CFGKIT_FILES=app.json,db.json cfgkit dump\n"
)]
pub struct Cli {
    /// Store driver (memory, env, json)
    #[arg(short, long, global = true, env = "CFGKIT_DRIVER", default_value = "json")]
    pub driver: Driver,

    /// Source file; repeat or comma-separate for several files
    #[arg(
        short = 'f',
        long = "file",
        global = true,
        env = "CFGKIT_FILES",
        value_delimiter = ',',
        value_name = "FILE"
    )]
    pub files: Vec<PathBuf>,

    /// Override a key; VALUE is parsed as JSON and falls back to a plain string
    #[arg(long = "set", global = true, value_name = "KEY=VALUE", value_parser = parse_override)]
    pub overrides: Vec<(String, Value)>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the value stored under KEY
    Get { key: String },

    /// Report whether KEY is defined (exit code 3 when it is not)
    Exists { key: String },

    /// Convert the value under KEY to a type
    Cast {
        key: String,

        /// Target type
        #[arg(long = "as", value_enum, default_value_t = CastTarget::String)]
        target: CastTarget,
    },

    /// Print everything the store holds
    Dump,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastTarget {
    String,
    Bool,
    Int,
    Float,
    List,
}

/// Parse `KEY=VALUE`, splitting on the first `=`.
pub fn parse_override(input: &str) -> Result<(String, Value), String> {
    let (key, raw) = input
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{input}'"))?;
    if key.trim().is_empty() {
        return Err("override key must not be empty".to_string());
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.trim().to_string(), value))
}
