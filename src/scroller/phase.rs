//! Phase data of the flick state machine.
//!
//! [`Motion`] carries each phase together with the only session data valid in
//! it, so a flick session and a correction can never be live at the same time.

use super::easing::{eased_between, eased_velocity};
use super::kinematics::{displacement, stop_time, velocity_at};
use crate::model::{sign, BoundarySide, Timestamp};
use serde::Serialize;

/// Externally visible phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlickPhase {
    /// No animation; the tick scheduler is stopped.
    Idle,
    /// Free deceleration after a flick.
    Normal,
    /// Decelerating past a bound under growing resistance.
    OverScroll,
    /// Springing back to the nearest bound.
    OverscrollCorrection,
}

/// Kinematic snapshot taken at flick start, or at every overscroll sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlickSession {
    /// Offset at the snapshot instant.
    pub start_offset: f64,
    /// Snapshot instant.
    pub start_time: Timestamp,
    /// Velocity in units/ms at the snapshot instant.
    pub initial_velocity: f64,
    /// Constant acceleration in units/ms², opposing `initial_velocity`.
    pub acceleration: f64,
    /// Where the motion comes to rest if nothing interferes.
    pub projected_final_offset: f64,
    /// Time until the velocity decays to zero.
    pub regular_phase_duration_ms: f64,
    /// Offset committed by the most recent tick of this session.
    pub last_sampled_offset: f64,
}

impl FlickSession {
    /// Snapshot for velocity `v0` decelerating under `acceleration` from `start_offset`.
    pub fn new(start_offset: f64, start_time: Timestamp, v0: f64, acceleration: f64) -> Self {
        let duration = stop_time(v0, acceleration).unwrap_or(0.0);
        Self {
            start_offset,
            start_time,
            initial_velocity: v0,
            acceleration,
            projected_final_offset: start_offset + displacement(v0, acceleration, duration),
            regular_phase_duration_ms: duration,
            last_sampled_offset: start_offset,
        }
    }

    /// Milliseconds since the snapshot.
    pub fn elapsed(&self, now: Timestamp) -> f64 {
        now.elapsed_since(self.start_time)
    }

    /// Physical velocity after `elapsed` ms.
    pub fn kinematic_velocity(&self, elapsed: f64) -> f64 {
        velocity_at(self.initial_velocity, self.acceleration, elapsed)
    }

    /// Physical position after `elapsed` ms.
    pub fn kinematic_offset(&self, elapsed: f64) -> f64 {
        self.start_offset + displacement(self.initial_velocity, self.acceleration, elapsed)
    }

    fn ratio(&self, elapsed: f64) -> f64 {
        if self.regular_phase_duration_ms <= 0.0 {
            1.0
        } else {
            elapsed / self.regular_phase_duration_ms
        }
    }

    /// Position on the ease-out curve toward the projected endpoint.
    pub fn eased_offset(&self, elapsed: f64) -> f64 {
        eased_between(
            self.start_offset,
            self.projected_final_offset,
            self.ratio(elapsed),
        )
    }

    /// Slope of the ease-out curve; 0 once the regular phase is over.
    pub fn eased_velocity(&self, elapsed: f64) -> f64 {
        eased_velocity(
            self.start_offset,
            self.projected_final_offset,
            self.regular_phase_duration_ms,
            self.ratio(elapsed),
        )
    }
}

/// Overscroll phase state: the side being overrun plus the latest local model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverscrollSession {
    /// Bound being overrun.
    pub side: BoundarySide,
    /// Velocity sign on entry; the phase ends when the live sign differs.
    pub entry_sign: f64,
    /// Local model re-snapshotted every tick.
    pub session: FlickSession,
}

impl OverscrollSession {
    /// Velocity at `now` under the latest local model, or 0 once arrested.
    pub fn velocity(&self, now: Timestamp) -> f64 {
        let v = self
            .session
            .kinematic_velocity(self.session.elapsed(now));
        if sign(v) == self.entry_sign {
            v
        } else {
            0.0
        }
    }
}

/// Spring-back from an overscrolled offset to the nearest bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    /// Instant the spring-back started.
    pub start_time: Timestamp,
    /// Overscrolled offset it started from.
    pub from_offset: f64,
    /// Bound it ends on.
    pub to_offset: f64,
    /// Wall-clock length of the spring-back.
    pub duration_ms: f64,
}

impl Correction {
    fn ratio(&self, now: Timestamp) -> f64 {
        if self.duration_ms <= 0.0 {
            1.0
        } else {
            now.elapsed_since(self.start_time) / self.duration_ms
        }
    }

    /// True once the wall-clock duration has passed.
    pub fn is_complete(&self, now: Timestamp) -> bool {
        self.ratio(now) >= 1.0
    }

    /// Eased position at `now`; `to_offset` once complete.
    pub fn offset_at(&self, now: Timestamp) -> f64 {
        eased_between(self.from_offset, self.to_offset, self.ratio(now))
    }

    /// Slope of the eased curve at `now`.
    pub fn velocity_at(&self, now: Timestamp) -> f64 {
        eased_velocity(
            self.from_offset,
            self.to_offset,
            self.duration_ms,
            self.ratio(now),
        )
    }

    /// Sign of travel: toward the target bound.
    pub fn direction(&self) -> f64 {
        sign(self.to_offset - self.from_offset)
    }
}

/// Lets a re-flick that interrupted a correction travel back through the
/// overscroll region on `side` without re-entering the overscroll phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bypass {
    /// Side whose overscroll check is skipped.
    pub side: BoundarySide,
}

/// Phase plus its live data.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Motion {
    /// Nothing running.
    #[default]
    Idle,
    /// Free deceleration along the eased curve.
    Normal(FlickSession),
    /// Resisted travel past a bound.
    OverScroll(OverscrollSession),
    /// Spring-back to the nearest bound.
    Correcting(Correction),
}

impl Motion {
    /// Externally visible tag of this phase.
    pub fn phase(&self) -> FlickPhase {
        match self {
            Motion::Idle => FlickPhase::Idle,
            Motion::Normal(_) => FlickPhase::Normal,
            Motion::OverScroll(_) => FlickPhase::OverScroll,
            Motion::Correcting(_) => FlickPhase::OverscrollCorrection,
        }
    }

    /// True for every phase but `Idle`.
    pub fn is_active(&self) -> bool {
        !matches!(self, Motion::Idle)
    }

    /// True while springing back.
    pub fn is_correcting(&self) -> bool {
        matches!(self, Motion::Correcting(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: f64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    #[test]
    fn unit_flick_session_projects_past_lower_bound() {
        let session = FlickSession::new(500.0, at(0.0), -1.0, 8e-4);
        assert!((session.regular_phase_duration_ms - 1250.0).abs() < 1e-9);
        assert!((session.projected_final_offset + 125.0).abs() < 1e-9);
    }

    #[test]
    fn eased_curve_reaches_projection_at_duration() {
        let session = FlickSession::new(0.0, at(0.0), 1.0, -8e-4);
        let end = session.eased_offset(session.regular_phase_duration_ms);
        assert!((end - session.projected_final_offset).abs() < 1e-9);
        assert_eq!(session.eased_velocity(session.regular_phase_duration_ms), 0.0);
    }

    #[test]
    fn zero_velocity_session_is_already_over() {
        let session = FlickSession::new(10.0, at(0.0), 0.0, 0.0);
        assert_eq!(session.regular_phase_duration_ms, 0.0);
        assert_eq!(session.projected_final_offset, 10.0);
        assert_eq!(session.eased_offset(5.0), 10.0);
    }

    #[test]
    fn correction_runs_from_offset_to_bound() {
        let correction = Correction {
            start_time: at(100.0),
            from_offset: -40.0,
            to_offset: 0.0,
            duration_ms: 350.0,
        };
        assert_eq!(correction.offset_at(at(100.0)), -40.0);
        assert!(!correction.is_complete(at(449.0)));
        assert!(correction.is_complete(at(450.0)));
        assert_eq!(correction.offset_at(at(450.0)), 0.0);
        assert_eq!(correction.direction(), 1.0);
        assert!(correction.velocity_at(at(200.0)) > 0.0);
    }

    #[test]
    fn overscroll_velocity_reports_zero_after_sign_flip() {
        let overscroll = OverscrollSession {
            side: BoundarySide::Below,
            entry_sign: -1.0,
            session: FlickSession::new(-5.0, at(0.0), -0.5, 1e-3),
        };
        assert!(overscroll.velocity(at(100.0)) < 0.0);
        assert_eq!(overscroll.velocity(at(600.0)), 0.0);
    }

    #[test]
    fn motion_phase_tags() {
        assert_eq!(Motion::Idle.phase(), FlickPhase::Idle);
        assert!(!Motion::Idle.is_active());
        let session = FlickSession::new(0.0, at(0.0), 1.0, -8e-4);
        assert_eq!(Motion::Normal(session).phase(), FlickPhase::Normal);
        assert!(Motion::Normal(session).is_active());
    }
}
