//! Error types for the kscroll binary.
//!
//! The scrolling engine itself never fails: invalid input degrades to a no-op.
//! Errors only exist at the edges where the binary touches the outside world
//! (configuration files, gesture scripts, the log file), and they compose into
//! [`AppError`] via `From` so `main` can propagate with `?`.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error for the binary
//!   - [`ConfigError`] - Config file read/parse/validation failures
//!   - [`ScriptError`] - Gesture script read/parse failures
//!   - [`LoggingError`] - Tracing subscriber initialization failures

use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::script::ScriptError;
use thiserror::Error;

/// Top-level error encompassing every fatal failure of the binary.
///
/// All variants are fatal: the binary prints the message and exits non-zero.
///
/// # Examples
///
/// ```no_run
/// use kinetic_scroll::model::error::AppError;
/// use kinetic_scroll::script::{Script, ScriptError};
///
/// fn load() -> Result<Script, AppError> {
///     // ScriptError converts to AppError via From
///     let script = read_script()?;
///     Ok(script)
/// }
/// # fn read_script() -> Result<Script, ScriptError> { Ok(Script::default()) }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The gesture script could not be read or parsed.
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    /// The tracing subscriber could not be installed.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// Writing the trace to stdout failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}
