//! Configuration module.
//!
//! [`ScrollerConfig`] is handed to the scroller at construction; nothing in the
//! engine reads ambient global state. [`loader`] resolves it from defaults, a
//! TOML file, environment variables and CLI flags.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, ConfigError, ConfigFile,
    ResolvedConfig,
};

use thiserror::Error;

/// Validation failure for a [`ScrollerConfig`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidConfig {
    /// A value that must be strictly positive and finite was not.
    #[error("{field} must be positive and finite (got {value})")]
    NotPositive {
        /// Config field name.
        field: &'static str,
        /// Offending value.
        value: f64,
    },

    /// A value that must be non-negative and finite was not.
    #[error("{field} must be non-negative and finite (got {value})")]
    Negative {
        /// Config field name.
        field: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Bounds are NaN or `min > max`.
    #[error("invalid bounds [{min}, {max}]")]
    Bounds {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
}

/// Overscroll-related subset of the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverscrollPolicy {
    /// Furthest the content may travel past a bound, in offset units.
    pub max_overscroll: f64,
    /// Base deceleration in units/ms².
    pub friction_base: f64,
    /// Duration of the spring-back animation.
    pub overscroll_correction_duration_ms: u32,
    /// Delay before a held, overscrolled pointer triggers a spring-back.
    pub overscroll_timeout_ms: u32,
}

/// Complete engine configuration, fixed at construction.
///
/// Offsets are in abstract "units", times in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollerConfig {
    /// Initial lower bound. `-inf` together with an infinite max disables scrolling.
    pub min_bound: f64,
    /// Initial upper bound.
    pub max_bound: f64,
    /// Furthest the content may travel past a bound.
    pub max_overscroll: f64,
    /// Base deceleration in units/ms².
    pub friction_base: f64,
    /// Maps input-device flick velocity to units/ms.
    pub flick_velocity_scalar: f64,
    /// Cap on accumulated flick speed in units/ms.
    pub max_speed: f64,
    /// Squared jitter radius below which drags during an animation are swallowed.
    pub tap_radius_squared: f64,
    /// Interval between animation ticks.
    pub tick_interval_ms: u32,
    /// Delay before a held, overscrolled pointer triggers a spring-back.
    pub overscroll_timeout_ms: u32,
    /// Window after pointer-down during which a running animation is watched for re-drags.
    pub flick_filter_timeout_ms: u32,
    /// Duration of the spring-back animation.
    pub overscroll_correction_duration_ms: u32,
    /// Window after a correction starts in which a fresh flick may bypass the overscroll check.
    pub bypass_window_ms: u32,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        Self {
            min_bound: f64::NEG_INFINITY,
            max_bound: f64::INFINITY,
            max_overscroll: 100.0,
            friction_base: 8e-4,
            flick_velocity_scalar: 2225.0,
            max_speed: 100.0,
            tap_radius_squared: 100.0,
            tick_interval_ms: 10,
            overscroll_timeout_ms: 200,
            flick_filter_timeout_ms: 100,
            overscroll_correction_duration_ms: 350,
            bypass_window_ms: 350,
        }
    }
}

impl ScrollerConfig {
    /// Builder-style bounds setter.
    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_bound = min;
        self.max_bound = max;
        self
    }

    /// Overscroll subset of this configuration.
    pub fn policy(&self) -> OverscrollPolicy {
        OverscrollPolicy {
            max_overscroll: self.max_overscroll.abs(),
            friction_base: self.friction_base,
            overscroll_correction_duration_ms: self.overscroll_correction_duration_ms,
            overscroll_timeout_ms: self.overscroll_timeout_ms,
        }
    }

    /// Check every field for values the physics cannot work with.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        positive("friction_base", self.friction_base)?;
        positive("flick_velocity_scalar", self.flick_velocity_scalar)?;
        positive("max_speed", self.max_speed)?;
        positive("tick_interval_ms", f64::from(self.tick_interval_ms))?;
        positive(
            "overscroll_correction_duration_ms",
            f64::from(self.overscroll_correction_duration_ms),
        )?;
        non_negative("max_overscroll", self.max_overscroll.abs())?;
        non_negative("tap_radius_squared", self.tap_radius_squared)?;

        let (min, max) = (self.min_bound, self.max_bound);
        if min.is_nan()
            || max.is_nan()
            || min > max
            || min == f64::INFINITY
            || max == f64::NEG_INFINITY
        {
            return Err(InvalidConfig::Bounds { min, max });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), InvalidConfig> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(InvalidConfig::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), InvalidConfig> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InvalidConfig::Negative { field, value })
    }
}
