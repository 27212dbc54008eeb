//! Configuration file loading with precedence handling.

use super::{InvalidConfig, ScrollerConfig};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// The resolved configuration is physically meaningless.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] InvalidConfig),
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/kscroll/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Lower scroll bound.
    #[serde(default)]
    pub min_bound: Option<f64>,

    /// Upper scroll bound.
    #[serde(default)]
    pub max_bound: Option<f64>,

    /// Maximum overscroll distance.
    #[serde(default)]
    pub max_overscroll: Option<f64>,

    /// Base friction in units/ms².
    #[serde(default)]
    pub friction_base: Option<f64>,

    /// Flick velocity normalization scalar.
    #[serde(default)]
    pub flick_velocity_scalar: Option<f64>,

    /// Flick speed cap in units/ms.
    #[serde(default)]
    pub max_speed: Option<f64>,

    /// Squared tap/jitter radius.
    #[serde(default)]
    pub tap_radius_squared: Option<f64>,

    /// Animation tick interval.
    #[serde(default)]
    pub tick_interval_ms: Option<u32>,

    /// Correction-trigger timeout after pointer-down.
    #[serde(default)]
    pub overscroll_timeout_ms: Option<u32>,

    /// Flick filter timeout after pointer-down.
    #[serde(default)]
    pub flick_filter_timeout_ms: Option<u32>,

    /// Spring-back duration.
    #[serde(default)]
    pub overscroll_correction_duration_ms: Option<u32>,

    /// Window in which a re-flick may interrupt a correction.
    #[serde(default)]
    pub bypass_window_ms: Option<u32>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Engine configuration.
    pub scroller: ScrollerConfig,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            scroller: ScrollerConfig::default(),
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/kscroll/kscroll.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("kscroll").join("kscroll.log")
    } else {
        PathBuf::from("kscroll.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/kscroll/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("kscroll").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `KSCROLL_CONFIG` environment variable
/// 3. Default path `~/.config/kscroll/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var("KSCROLL_CONFIG") {
        if env_path.is_empty() {
            return Err(ConfigError::InvalidPath(env_path));
        }
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `KSCROLL_MAX_OVERSCROLL`: Override max overscroll
/// - `KSCROLL_FRICTION`: Override base friction
/// - `KSCROLL_TICK_MS`: Override tick interval
///
/// Values that fail to parse are ignored with a warning.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Some(value) = env_number::<f64>("KSCROLL_MAX_OVERSCROLL") {
        config.scroller.max_overscroll = value;
    }

    if let Some(value) = env_number::<f64>("KSCROLL_FRICTION") {
        config.scroller.friction_base = value;
    }

    if let Some(value) = env_number::<u32>("KSCROLL_TICK_MS") {
        config.scroller.tick_interval_ms = value;
    }

    config
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    let base = defaults.scroller;
    ResolvedConfig {
        scroller: ScrollerConfig {
            min_bound: config.min_bound.unwrap_or(base.min_bound),
            max_bound: config.max_bound.unwrap_or(base.max_bound),
            max_overscroll: config.max_overscroll.unwrap_or(base.max_overscroll),
            friction_base: config.friction_base.unwrap_or(base.friction_base),
            flick_velocity_scalar: config
                .flick_velocity_scalar
                .unwrap_or(base.flick_velocity_scalar),
            max_speed: config.max_speed.unwrap_or(base.max_speed),
            tap_radius_squared: config
                .tap_radius_squared
                .unwrap_or(base.tap_radius_squared),
            tick_interval_ms: config.tick_interval_ms.unwrap_or(base.tick_interval_ms),
            overscroll_timeout_ms: config
                .overscroll_timeout_ms
                .unwrap_or(base.overscroll_timeout_ms),
            flick_filter_timeout_ms: config
                .flick_filter_timeout_ms
                .unwrap_or(base.flick_filter_timeout_ms),
            overscroll_correction_duration_ms: config
                .overscroll_correction_duration_ms
                .unwrap_or(base.overscroll_correction_duration_ms),
            bypass_window_ms: config.bypass_window_ms.unwrap_or(base.bypass_window_ms),
        },
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    max_overscroll_override: Option<f64>,
    friction_override: Option<f64>,
    tick_override: Option<u32>,
) -> ResolvedConfig {
    if let Some(max_overscroll) = max_overscroll_override {
        config.scroller.max_overscroll = max_overscroll;
    }

    if let Some(friction) = friction_override {
        config.scroller.friction_base = friction;
    }

    if let Some(tick) = tick_override {
        config.scroller.tick_interval_ms = tick;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
