//! Constant-acceleration kinematics.
//!
//! `v(t) = v0 + a·t`, `s(t) = v0·t + ½·a·t²`. Friction always opposes motion.

use crate::model::sign;

/// Deceleration opposing `velocity`: `friction_base · -sign(v)`.
pub fn opposing_friction(velocity: f64, friction_base: f64) -> f64 {
    friction_base * -sign(velocity)
}

/// Deceleration inside the overscroll region.
///
/// Grows linearly with depth: the base friction at the bound, twice the base
/// friction at `max_overscroll`.
pub fn overscroll_friction(
    velocity: f64,
    friction_base: f64,
    depth: f64,
    max_overscroll: f64,
) -> f64 {
    let scale = if max_overscroll > 0.0 {
        1.0 + depth.max(0.0) / max_overscroll
    } else {
        1.0
    };
    opposing_friction(velocity, friction_base) * scale
}

/// Velocity after `t` ms.
pub fn velocity_at(v0: f64, accel: f64, t: f64) -> f64 {
    v0 + accel * t
}

/// Distance travelled after `t` ms.
pub fn displacement(v0: f64, accel: f64, t: f64) -> f64 {
    v0 * t + 0.5 * accel * t * t
}

/// Time until `v0` decays to zero under `accel`, or `None` if it never does.
pub fn stop_time(v0: f64, accel: f64) -> Option<f64> {
    if accel == 0.0 {
        return None;
    }
    let t = -v0 / accel;
    (t.is_finite() && t >= 0.0).then_some(t)
}
