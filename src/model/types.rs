//! Core scroll-model newtypes

use serde::Serialize;

/// Tolerance for offset comparisons (boundary crossings, "already at target").
pub const OFFSET_EPSILON: f64 = 1e-6;

/// Tolerance for velocity comparisons (sign flips, "no flick").
pub const VELOCITY_EPSILON: f64 = 1e-9;

/// A point in time, in milliseconds since an arbitrary clock origin.
///
/// All engine formulas are written against elapsed wall-clock time between two
/// timestamps, never against tick counts, so a late tick self-corrects.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
pub struct Timestamp(f64);

impl Timestamp {
    /// Clock origin.
    pub const ZERO: Self = Self(0.0);

    /// Create a timestamp from raw milliseconds.
    pub fn from_millis(ms: f64) -> Self {
        Self(ms)
    }

    /// Get the raw millisecond value.
    pub fn as_millis(&self) -> f64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`. Never negative.
    pub fn elapsed_since(&self, earlier: Timestamp) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }

    /// Timestamp `ms` milliseconds after this one.
    pub fn plus_ms(&self, ms: f64) -> Self {
        Self(self.0 + ms)
    }
}

/// Which side of the scroll range an offset has left through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BoundarySide {
    /// Below `min`.
    Below,
    /// Above `max`.
    Above,
}

impl BoundarySide {
    /// Sign of a velocity that moves content back toward the range from this side.
    pub fn inward_sign(&self) -> f64 {
        match self {
            BoundarySide::Below => 1.0,
            BoundarySide::Above => -1.0,
        }
    }
}

/// Scrollable range of the offset.
///
/// An infinite bound is never crossed. `[-inf, +inf]` means scrolling is
/// disabled: a valid, permanent state rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollBounds {
    /// Lowest in-range offset.
    pub min: f64,
    /// Highest in-range offset.
    pub max: f64,
}

impl Default for ScrollBounds {
    fn default() -> Self {
        Self::DISABLED
    }
}

impl ScrollBounds {
    /// Both bounds infinite: every mutator becomes a no-op.
    pub const DISABLED: Self = Self {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };

    /// Create bounds from a raw pair.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// True when both bounds are infinite.
    pub fn is_disabled(&self) -> bool {
        self.min == f64::NEG_INFINITY && self.max == f64::INFINITY
    }

    /// Side of the range `offset` lies beyond, if any.
    pub fn overscroll_side(&self, offset: f64) -> Option<BoundarySide> {
        if self.is_disabled() {
            return None;
        }
        if self.min.is_finite() && offset < self.min - OFFSET_EPSILON {
            Some(BoundarySide::Below)
        } else if self.max.is_finite() && offset > self.max + OFFSET_EPSILON {
            Some(BoundarySide::Above)
        } else {
            None
        }
    }

    /// True when `offset` lies outside `[min, max]`.
    pub fn is_overscrolled(&self, offset: f64) -> bool {
        self.overscroll_side(offset).is_some()
    }

    /// How far past the nearest bound `offset` is; 0 when in range.
    pub fn overscroll_depth(&self, offset: f64) -> f64 {
        match self.overscroll_side(offset) {
            Some(BoundarySide::Below) => self.min - offset,
            Some(BoundarySide::Above) => offset - self.max,
            None => 0.0,
        }
    }

    /// The bound on `side`.
    pub fn bound(&self, side: BoundarySide) -> f64 {
        match side {
            BoundarySide::Below => self.min,
            BoundarySide::Above => self.max,
        }
    }

    /// Nearest bound to an overscrolled `offset`, or `None` when in range.
    pub fn nearest_bound(&self, offset: f64) -> Option<f64> {
        self.overscroll_side(offset).map(|side| self.bound(side))
    }
}

/// Payload of the offset-changed notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OffsetChange {
    /// Offset before the mutation.
    pub previous: f64,
    /// Offset after the mutation (already committed).
    pub current: f64,
}

/// Sign of `value` with a dead zone of `VELOCITY_EPSILON` around zero.
pub fn sign(value: f64) -> f64 {
    if value > VELOCITY_EPSILON {
        1.0
    } else if value < -VELOCITY_EPSILON {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bounds_are_disabled() {
        assert!(ScrollBounds::default().is_disabled());
    }

    #[test]
    fn disabled_bounds_never_overscroll() {
        let bounds = ScrollBounds::DISABLED;
        assert!(!bounds.is_overscrolled(-1e12));
        assert!(!bounds.is_overscrolled(1e12));
    }

    #[test]
    fn infinite_min_only_checks_upper_bound() {
        let bounds = ScrollBounds::new(f64::NEG_INFINITY, 100.0);
        assert!(!bounds.is_disabled());
        assert!(!bounds.is_overscrolled(-5000.0));
        assert_eq!(bounds.overscroll_side(150.0), Some(BoundarySide::Above));
    }

    #[test]
    fn infinite_max_only_checks_lower_bound() {
        let bounds = ScrollBounds::new(0.0, f64::INFINITY);
        assert!(!bounds.is_overscrolled(1e9));
        assert_eq!(bounds.overscroll_side(-1.0), Some(BoundarySide::Below));
    }

    #[test]
    fn offset_on_bound_is_not_overscrolled() {
        let bounds = ScrollBounds::new(0.0, 1000.0);
        assert!(!bounds.is_overscrolled(0.0));
        assert!(!bounds.is_overscrolled(1000.0));
        assert!(!bounds.is_overscrolled(-1e-9), "noise near the bound is tolerated");
    }

    #[test]
    fn depth_and_nearest_bound() {
        let bounds = ScrollBounds::new(0.0, 1000.0);
        assert_eq!(bounds.overscroll_depth(-20.0), 20.0);
        assert_eq!(bounds.overscroll_depth(1030.0), 30.0);
        assert_eq!(bounds.overscroll_depth(500.0), 0.0);
        assert_eq!(bounds.nearest_bound(-20.0), Some(0.0));
        assert_eq!(bounds.nearest_bound(1030.0), Some(1000.0));
        assert_eq!(bounds.nearest_bound(500.0), None);
    }

    #[test]
    fn sign_has_dead_zone() {
        assert_eq!(sign(0.5), 1.0);
        assert_eq!(sign(-0.5), -1.0);
        assert_eq!(sign(1e-12), 0.0);
        assert_eq!(sign(0.0), 0.0);
    }

    #[test]
    fn timestamp_elapsed_is_never_negative() {
        let early = Timestamp::from_millis(10.0);
        let late = Timestamp::from_millis(25.0);
        assert_eq!(late.elapsed_since(early), 15.0);
        assert_eq!(early.elapsed_since(late), 0.0);
        assert_eq!(early.plus_ms(5.0).as_millis(), 15.0);
    }
}
