//! The kinetic scroller state machine.
//!
//! # Phases
//!
//! ```text
//!            handle_flick
//!   Idle ───────────────────▶ Normal ──(duration over, in range)──▶ Idle
//!    ▲                          │
//!    │                          │ offset left the range
//!    │                          ▼
//!    │                      OverScroll ──(velocity sign flipped,
//!    │                          │          or max overscroll hit)
//!    │                          ▼
//!    └──(duration over)── OverscrollCorrection ◀── pointer up / timeout /
//!                                                  correct_overscroll_now
//! ```
//!
//! Every public mutator and [`KineticScroller::tick`] runs to completion on
//! the caller's thread. Starting any phase first tears down the current one.

use super::clock::{Clock, SystemClock};
use super::kinematics::{opposing_friction, overscroll_friction};
use super::phase::{Bypass, Correction, FlickPhase, FlickSession, Motion, OverscrollSession};
use super::timers::{Deadline, Ticker};
use crate::config::{InvalidConfig, ScrollerConfig};
use crate::model::{
    sign, BoundarySide, OffsetChange, ScrollBounds, Timestamp, OFFSET_EPSILON, VELOCITY_EPSILON,
};
use tracing::{debug, trace, warn};

/// Resistance applied to drags past a bound: content moves at half rate.
const OVERSCROLL_DRAG_FACTOR: f64 = 0.5;

type OffsetObserver = Box<dyn FnMut(OffsetChange)>;

/// One-dimensional kinetic scroller.
///
/// Owns a single scroll offset and converts drags and flicks into motion,
/// resisting and correcting overscroll past its [`ScrollBounds`].
///
/// The host drives time: call [`tick`](Self::tick) every
/// `tick_interval_ms` while [`next_wakeup`](Self::next_wakeup) returns
/// `Some`, and observe the offset through
/// [`set_offset_observer`](Self::set_offset_observer).
pub struct KineticScroller<C: Clock = SystemClock> {
    config: ScrollerConfig,
    clock: C,
    bounds: ScrollBounds,
    max_overscroll: f64,

    offset: f64,
    previous_velocity: f64,
    accumulated_drag: f64,
    motion: Motion,
    bypass: Option<Bypass>,

    ticker: Ticker,
    correction_trigger: Deadline,
    flick_filter: Deadline,

    observer: Option<OffsetObserver>,
}

impl<C: Clock> std::fmt::Debug for KineticScroller<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KineticScroller")
            .field("offset", &self.offset)
            .field("bounds", &self.bounds)
            .field("phase", &self.motion.phase())
            .field("previous_velocity", &self.previous_velocity)
            .field("accumulated_drag", &self.accumulated_drag)
            .finish_non_exhaustive()
    }
}

impl KineticScroller<SystemClock> {
    /// Scroller on the system clock.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `config` fails [`ScrollerConfig::validate`].
    pub fn new(config: ScrollerConfig) -> Result<Self, InvalidConfig> {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock> KineticScroller<C> {
    /// Scroller reading time from `clock`.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `config` fails [`ScrollerConfig::validate`].
    pub fn with_clock(config: ScrollerConfig, clock: C) -> Result<Self, InvalidConfig> {
        config.validate()?;
        Ok(Self {
            bounds: ScrollBounds::new(config.min_bound, config.max_bound),
            max_overscroll: config.max_overscroll.abs(),
            ticker: Ticker::new(config.tick_interval_ms),
            config,
            clock,
            offset: 0.0,
            previous_velocity: 0.0,
            accumulated_drag: 0.0,
            motion: Motion::Idle,
            bypass: None,
            correction_trigger: Deadline::default(),
            flick_filter: Deadline::default(),
            observer: None,
        })
    }

    // ===== Observation =====

    /// Register the single offset-changed subscriber, replacing any previous one.
    ///
    /// Called synchronously after every committed mutation of the offset.
    pub fn set_offset_observer(&mut self, observer: impl FnMut(OffsetChange) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Remove the offset-changed subscriber.
    pub fn clear_offset_observer(&mut self) {
        self.observer = None;
    }

    // ===== Queries =====

    /// Committed scroll offset.
    pub fn current_offset(&self) -> f64 {
        self.offset
    }

    /// Current scroll range.
    pub fn bounds(&self) -> ScrollBounds {
        self.bounds
    }

    /// How far past a bound content may travel. Always non-negative.
    pub fn max_overscroll(&self) -> f64 {
        self.max_overscroll
    }

    /// Configuration the scroller was built with.
    ///
    /// Bounds and max overscroll changed at runtime are not reflected here;
    /// see [`bounds`](Self::bounds) and [`max_overscroll`](Self::max_overscroll).
    pub fn config(&self) -> &ScrollerConfig {
        &self.config
    }

    /// Phase of the flick state machine.
    pub fn phase(&self) -> FlickPhase {
        self.motion.phase()
    }

    /// True while any animation (flick, overscroll or correction) is running.
    pub fn is_animating(&self) -> bool {
        self.ticker.is_running()
    }

    /// True if the offset lies outside the bounds.
    pub fn is_overscrolled(&self) -> bool {
        self.bounds.is_overscrolled(self.offset)
    }

    /// Last committed flick velocity in units/ms; 0 once motion has ended.
    pub fn previous_velocity(&self) -> f64 {
        self.previous_velocity
    }

    /// Drag swallowed as jitter and not yet applied.
    pub fn accumulated_drag(&self) -> f64 {
        self.accumulated_drag
    }

    /// True while the flick filter armed by pointer-down is pending.
    pub fn is_flick_filter_armed(&self) -> bool {
        self.flick_filter.is_armed()
    }

    /// True while a held pointer is waiting to trigger a spring-back.
    pub fn is_correction_pending(&self) -> bool {
        self.correction_trigger.is_armed()
    }

    /// Velocity of the live animation in units/ms at the current instant; 0 when idle.
    pub fn instantaneous_velocity(&self) -> f64 {
        let now = self.clock.now();
        match &self.motion {
            Motion::Idle => 0.0,
            Motion::Normal(session) => session.eased_velocity(session.elapsed(now)),
            Motion::OverScroll(overscroll) => overscroll.velocity(now),
            Motion::Correcting(correction) => correction.velocity_at(now),
        }
    }

    /// Earliest instant the host must call [`tick`](Self::tick) again.
    ///
    /// `None` means the scroller is quiescent until the next input.
    pub fn next_wakeup(&self) -> Option<Timestamp> {
        [
            self.ticker.next_due(),
            self.correction_trigger.due(),
            self.flick_filter.due(),
        ]
        .into_iter()
        .flatten()
        .min_by(|a, b| a.as_millis().total_cmp(&b.as_millis()))
    }

    // ===== Configuration =====

    /// Replace the scroll range.
    ///
    /// Running sessions keep their projections; the next tick checks
    /// overscroll against the new range. An idle scroller left out of range
    /// starts springing back immediately. Disabling scrolling stops
    /// everything where it is.
    pub fn set_bounds(&mut self, min: f64, max: f64) {
        if min.is_nan() || max.is_nan() || min > max {
            warn!(min, max, "Ignoring invalid scroll bounds");
            return;
        }
        self.bounds = ScrollBounds::new(min, max);
        debug!(min, max, "Scroll bounds changed");

        if self.bounds.is_disabled() {
            self.cancel_timers();
            self.accumulated_drag = 0.0;
            self.halt();
            return;
        }

        if !self.motion.is_active() && self.is_overscrolled() {
            let now = self.clock.now();
            self.start_correction(now);
        }
    }

    /// Set how far content may travel past a bound. Stored as `|v|`.
    pub fn set_max_overscroll(&mut self, value: f64) {
        if !value.is_finite() {
            warn!(value, "Ignoring non-finite max overscroll");
            return;
        }
        self.max_overscroll = value.abs();
    }

    /// Reposition the content directly, cancelling any animation.
    pub fn set_offset(&mut self, offset: f64) {
        if self.bounds.is_disabled() || !offset.is_finite() {
            return;
        }
        self.cancel_timers();
        self.halt();
        self.commit_offset(offset);
    }

    // ===== Input =====

    /// A finger dragged the content by `delta`.
    pub fn scroll_by(&mut self, delta: f64) {
        if self.bounds.is_disabled() || !delta.is_finite() || delta == 0.0 {
            return;
        }

        if self.motion.is_active() {
            let animation_sign = sign(self.instantaneous_velocity());
            if animation_sign != 0.0 && sign(delta) == animation_sign {
                self.accumulated_drag += delta;
                if self.accumulated_drag * self.accumulated_drag < self.config.tap_radius_squared {
                    trace!(
                        delta,
                        accumulated = self.accumulated_drag,
                        "Absorbed drag jitter during animation"
                    );
                    return;
                }
                let total = std::mem::take(&mut self.accumulated_drag);
                debug!(total, "Drag left the jitter radius; taking over animation");
                self.halt();
                self.apply_drag(total);
                return;
            }
            debug!(delta, "Opposing drag cancels animation");
            self.accumulated_drag = 0.0;
            self.halt();
        }

        self.apply_drag(delta);
    }

    /// A finger touched the content.
    ///
    /// Out of range, arms the overscroll timeout that springs the content
    /// back if the finger is held. During an animation, also arms the flick
    /// filter. The filter changes no state when it expires; it is visible
    /// only through [`is_flick_filter_armed`](Self::is_flick_filter_armed)
    /// and [`next_wakeup`](Self::next_wakeup), and pointer-up or a new flick
    /// disarms it.
    pub fn on_pointer_down(&mut self) {
        if self.bounds.is_disabled() {
            return;
        }
        let now = self.clock.now();
        self.accumulated_drag = 0.0;

        if self.is_overscrolled()
            && !self.motion.is_correcting()
            && !self.correction_trigger.is_armed()
        {
            self.correction_trigger
                .arm(now, self.config.overscroll_timeout_ms);
            debug!(offset = self.offset, "Armed overscroll correction trigger");
        }

        if self.motion.is_active() {
            self.flick_filter.arm(now, self.config.flick_filter_timeout_ms);
        }
    }

    /// The finger lifted.
    pub fn on_pointer_up(&mut self) {
        if self.bounds.is_disabled() {
            return;
        }
        self.flick_filter.cancel();
        self.correction_trigger.cancel();

        if !self.motion.is_active() && self.accumulated_drag != 0.0 {
            let pending = std::mem::take(&mut self.accumulated_drag);
            self.scroll_by(pending);
        }

        if self.is_overscrolled() && !self.motion.is_correcting() {
            let now = self.clock.now();
            self.start_correction(now);
        }
    }

    /// The finger released with `raw_velocity` (input-device units).
    ///
    /// Positive raw velocity scrolls toward lower offsets.
    pub fn handle_flick(&mut self, raw_velocity: f64) {
        if self.bounds.is_disabled() || !raw_velocity.is_finite() {
            return;
        }
        let now = self.clock.now();
        let velocity = -raw_velocity / self.config.flick_velocity_scalar;
        let v0 = self.combine_momentum(velocity);

        if v0.abs() < VELOCITY_EPSILON {
            debug!("Zero-velocity flick ignored");
            if !self.motion.is_active() && self.is_overscrolled() {
                self.start_correction(now);
            }
            return;
        }

        let bypass = self.bypass_for_reflick(now, v0);

        self.cancel_timers();
        self.halt();

        self.previous_velocity = v0;
        self.accumulated_drag = 0.0;
        self.bypass = bypass;

        let accel = opposing_friction(v0, self.config.friction_base);
        let session = FlickSession::new(self.offset, now, v0, accel);
        debug!(
            velocity = v0,
            start = session.start_offset,
            projected = session.projected_final_offset,
            duration_ms = session.regular_phase_duration_ms,
            bypass = bypass.is_some(),
            "Flick started"
        );
        self.motion = Motion::Normal(session);
        self.ticker.start(now);
        self.step(now);
    }

    /// Stop all motion where it is. No-op when already idle.
    pub fn stop_immediately(&mut self) {
        if !self.motion.is_active()
            && !self.correction_trigger.is_armed()
            && !self.flick_filter.is_armed()
        {
            return;
        }
        debug!(offset = self.offset, "Stopped immediately");
        self.cancel_timers();
        self.halt();
    }

    /// Spring back to the nearest bound now, if overscrolled and not already doing so.
    pub fn correct_overscroll_now(&mut self) {
        if self.bounds.is_disabled() || !self.is_overscrolled() || self.motion.is_correcting() {
            return;
        }
        let now = self.clock.now();
        self.start_correction(now);
    }

    // ===== Tick =====

    /// Periodic callback. Fires due timers, then advances the active phase.
    pub fn tick(&mut self) {
        let now = self.clock.now();

        if self.correction_trigger.take_if_due(now)
            && self.is_overscrolled()
            && !self.motion.is_correcting()
        {
            debug!(offset = self.offset, "Overscroll timeout elapsed");
            self.start_correction(now);
        }

        if self.flick_filter.take_if_due(now) {
            trace!("Flick filter elapsed without a re-drag");
        }

        if self.ticker.is_running() {
            self.ticker.mark_ticked(now);
            self.step(now);
        }
    }

    fn step(&mut self, now: Timestamp) {
        match self.motion {
            Motion::Idle => self.ticker.stop(),
            Motion::Normal(session) => self.step_normal(now, session),
            Motion::OverScroll(overscroll) => self.step_overscroll(now, overscroll),
            Motion::Correcting(correction) => self.step_correction(now, correction),
        }
    }

    fn step_normal(&mut self, now: Timestamp, mut session: FlickSession) {
        let elapsed = session.elapsed(now);
        let side = self.bounds.overscroll_side(self.offset);

        if let Some(bypass) = self.bypass {
            if side != Some(bypass.side) {
                debug!(offset = self.offset, "Re-flick crossed back into range");
                self.bypass = None;
            }
        }

        if let Some(side) = side {
            if self.bypass.is_none() {
                let velocity = session.kinematic_velocity(elapsed);
                self.enter_overscroll(now, side, velocity);
                return;
            }
        }

        let settled = elapsed >= session.regular_phase_duration_ms;
        let next = if settled {
            session.projected_final_offset
        } else {
            session.eased_offset(elapsed)
        };

        if let Some(limit) = self.overrun_limit(next) {
            debug!(offset = next, limit, "Flick sample past the overscroll limit");
            self.commit_offset(limit);
            self.finish(now);
            return;
        }

        if settled {
            self.commit_offset(next);
            self.finish(now);
            return;
        }

        trace!(elapsed, offset = next, "Normal tick");
        session.last_sampled_offset = next;
        self.motion = Motion::Normal(session);
        self.commit_offset(next);
    }

    fn enter_overscroll(&mut self, now: Timestamp, side: BoundarySide, velocity: f64) {
        let depth = self.bounds.overscroll_depth(self.offset);
        let outward = sign(velocity) == -side.inward_sign();

        if !outward || self.max_overscroll <= OFFSET_EPSILON || depth >= self.max_overscroll {
            self.start_correction(now);
            return;
        }

        let accel = overscroll_friction(
            velocity,
            self.config.friction_base,
            depth,
            self.max_overscroll,
        );
        debug!(offset = self.offset, velocity, depth, ?side, "Entered overscroll");
        self.motion = Motion::OverScroll(OverscrollSession {
            side,
            entry_sign: sign(velocity),
            session: FlickSession::new(self.offset, now, velocity, accel),
        });
    }

    fn step_overscroll(&mut self, now: Timestamp, mut overscroll: OverscrollSession) {
        let session = overscroll.session;
        let elapsed = session.elapsed(now);
        let velocity = session.kinematic_velocity(elapsed);
        let limit = self.bounds.bound(overscroll.side)
            - overscroll.side.inward_sign() * self.max_overscroll;

        if sign(velocity) != overscroll.entry_sign {
            let rest = self.clamp_to_limit(session.projected_final_offset, overscroll.side, limit);
            debug!(offset = rest, "Overscroll arrested");
            self.commit_offset(rest);
            self.start_correction(now);
            return;
        }

        let next = session.kinematic_offset(elapsed);
        if self.bounds.overscroll_depth(next) >= self.max_overscroll
            && self.bounds.overscroll_side(next) == Some(overscroll.side)
        {
            debug!(offset = limit, "Overscroll hit its limit");
            self.commit_offset(limit);
            self.start_correction(now);
            return;
        }

        trace!(elapsed, offset = next, velocity, "Overscroll tick");
        self.commit_offset(next);

        if self.bounds.overscroll_side(self.offset) != Some(overscroll.side) {
            // Only reachable when the bounds moved under a running overscroll.
            self.finish(now);
            return;
        }

        let depth = self.bounds.overscroll_depth(self.offset);
        let accel = overscroll_friction(
            velocity,
            self.config.friction_base,
            depth,
            self.max_overscroll,
        );
        overscroll.session = FlickSession::new(self.offset, now, velocity, accel);
        self.motion = Motion::OverScroll(overscroll);
    }

    fn step_correction(&mut self, now: Timestamp, correction: Correction) {
        if correction.is_complete(now) {
            self.commit_offset(correction.to_offset);
            debug!(offset = self.offset, "Overscroll correction complete");
            self.finish(now);
            return;
        }
        let next = correction.offset_at(now);
        trace!(offset = next, "Correction tick");
        self.commit_offset(next);
    }

    // ===== Internals =====

    fn start_correction(&mut self, now: Timestamp) {
        self.correction_trigger.cancel();
        let Some(target) = self.bounds.nearest_bound(self.offset) else {
            self.halt();
            return;
        };
        self.halt();
        let correction = Correction {
            start_time: now,
            from_offset: self.offset,
            to_offset: target,
            duration_ms: f64::from(self.config.overscroll_correction_duration_ms),
        };
        debug!(from = self.offset, to = target, "Overscroll correction started");
        self.motion = Motion::Correcting(correction);
        self.ticker.start(now);
    }

    /// Motion ended on its own: go idle, or spring back if it ended out of range.
    fn finish(&mut self, now: Timestamp) {
        self.halt();
        if self.is_overscrolled() {
            self.start_correction(now);
        } else {
            debug!(offset = self.offset, "Motion settled");
        }
    }

    /// Stop the scheduler and drop all session state. The offset stays put.
    fn halt(&mut self) {
        self.ticker.stop();
        self.motion = Motion::Idle;
        self.previous_velocity = 0.0;
        self.bypass = None;
    }

    fn cancel_timers(&mut self) {
        self.correction_trigger.cancel();
        self.flick_filter.cancel();
    }

    fn apply_drag(&mut self, delta: f64) {
        let applied = if self.is_overscrolled() {
            delta * OVERSCROLL_DRAG_FACTOR
        } else {
            delta
        };
        self.correction_trigger.cancel();
        self.commit_offset(self.offset + applied);
    }

    fn combine_momentum(&self, velocity: f64) -> f64 {
        let max_speed = self.config.max_speed;
        if sign(velocity) != sign(self.previous_velocity) {
            velocity.clamp(-max_speed, max_speed)
        } else {
            (velocity + self.previous_velocity).clamp(-max_speed, max_speed)
        }
    }

    /// A flick that interrupts a fresh correction, heading back toward the
    /// range, is allowed through the overscroll region it is leaving.
    fn bypass_for_reflick(&self, now: Timestamp, v0: f64) -> Option<Bypass> {
        let Motion::Correcting(correction) = self.motion else {
            return None;
        };
        let within_window =
            now.elapsed_since(correction.start_time) <= f64::from(self.config.bypass_window_ms);
        if !within_window || sign(v0) != correction.direction() {
            return None;
        }
        self.bounds
            .overscroll_side(self.offset)
            .map(|side| Bypass { side })
    }

    /// The overscroll limit `offset` runs past, unless that side is bypassed.
    fn overrun_limit(&self, offset: f64) -> Option<f64> {
        let side = self.bounds.overscroll_side(offset)?;
        if self.bypass.is_some_and(|bypass| bypass.side == side)
            || self.bounds.overscroll_depth(offset) <= self.max_overscroll
        {
            return None;
        }
        Some(self.bounds.bound(side) - side.inward_sign() * self.max_overscroll)
    }

    fn clamp_to_limit(&self, offset: f64, side: BoundarySide, limit: f64) -> f64 {
        match side {
            BoundarySide::Below => offset.max(limit),
            BoundarySide::Above => offset.min(limit),
        }
    }

    /// The single setter for `offset`. Commits first, then notifies.
    fn commit_offset(&mut self, offset: f64) {
        if offset == self.offset {
            return;
        }
        let previous = self.offset;
        self.offset = offset;
        if let Some(observer) = self.observer.as_mut() {
            observer(OffsetChange {
                previous,
                current: offset,
            });
        }
    }
}

#[cfg(test)]
#[path = "kinetic_tests.rs"]
mod tests;
