//! Closed-form easing curves evaluated against elapsed time.

/// Ease-out cubic: `(r - 1)^3 + 1`, with `r` clamped to `[0, 1]`.
///
/// Starts at full speed and decelerates smoothly to rest.
pub fn ease_out_cubic(ratio: f64) -> f64 {
    let r = ratio.clamp(0.0, 1.0);
    let inv = r - 1.0;
    inv * inv * inv + 1.0
}

/// Derivative of [`ease_out_cubic`] with respect to `r`: `3(1 - r)^2`.
pub fn ease_out_cubic_slope(ratio: f64) -> f64 {
    let r = ratio.clamp(0.0, 1.0);
    3.0 * (1.0 - r) * (1.0 - r)
}

/// Position along an eased segment from `from` to `to` at `ratio`.
pub fn eased_between(from: f64, to: f64, ratio: f64) -> f64 {
    from + (to - from) * ease_out_cubic(ratio)
}

/// Rate of change (units/ms) of an eased segment lasting `duration_ms`.
pub fn eased_velocity(from: f64, to: f64, duration_ms: f64, ratio: f64) -> f64 {
    if duration_ms <= 0.0 {
        return 0.0;
    }
    (to - from) / duration_ms * ease_out_cubic_slope(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
    }

    #[test]
    fn clamps_outside_unit_interval() {
        assert_eq!(ease_out_cubic(-0.5), 0.0);
        assert_eq!(ease_out_cubic(2.0), 1.0);
        assert_eq!(ease_out_cubic_slope(1.5), 0.0);
    }

    #[test]
    fn front_loaded() {
        // Half the time covers seven eighths of the distance.
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn monotonic() {
        let mut last = 0.0;
        for i in 1..=100 {
            let value = ease_out_cubic(i as f64 / 100.0);
            assert!(value >= last);
            last = value;
        }
    }

    #[test]
    fn eased_between_hits_both_ends() {
        assert_eq!(eased_between(-40.0, 0.0, 0.0), -40.0);
        assert_eq!(eased_between(-40.0, 0.0, 1.0), 0.0);
    }

    #[test]
    fn eased_velocity_points_toward_target_and_decays() {
        let start = eased_velocity(-40.0, 0.0, 350.0, 0.0);
        let later = eased_velocity(-40.0, 0.0, 350.0, 0.8);
        assert!(start > 0.0);
        assert!(later > 0.0 && later < start);
        assert_eq!(eased_velocity(-40.0, 0.0, 350.0, 1.0), 0.0);
        assert_eq!(eased_velocity(-40.0, 0.0, 0.0, 0.5), 0.0);
    }
}
