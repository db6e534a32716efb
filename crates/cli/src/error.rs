//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map library errors found in an `anyhow` chain to exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).

use cfgkit::{CastError, ConfigError};
use thiserror::Error;

/// Structured exit codes for cfgkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - unhandled or generic failure.
    GeneralError = 1,

    /// A source file could not be read or parsed.
    LoadError = 2,

    /// The requested key is not defined.
    NotFound = 3,

    /// The value exists but cannot be converted to the requested type.
    CastError = 4,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

/// Returned when a command needs a key that no source defines.
#[derive(Error, Debug)]
#[error("key '{0}' is not defined")]
pub struct KeyNotFound(pub String);

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if cause.downcast_ref::<ConfigError>().is_some() {
                return ExitCode::LoadError;
            }
            if cause.downcast_ref::<KeyNotFound>().is_some() {
                return ExitCode::NotFound;
            }
            if cause.downcast_ref::<CastError>().is_some() {
                return ExitCode::CastError;
            }
        }
        ExitCode::GeneralError
    }
}
