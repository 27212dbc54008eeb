//! Deterministic simulation driver.
//!
//! Runs a [`KineticScroller`] on a [`ManualClock`], playing the role of the
//! host: input events are applied at the current synthetic instant, and time
//! advances in `tick_interval_ms` steps, ticking the scroller whenever it
//! asked to be woken. Every tick and every input produces a [`Sample`].

use crate::config::{InvalidConfig, ScrollerConfig};
use crate::scroller::{Clock, FlickPhase, KineticScroller, ManualClock};
use crate::script::{Script, ScriptEvent};
use serde::Serialize;
use tracing::{debug, info};

/// Scroller state at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Synthetic time in milliseconds.
    pub t_ms: f64,
    /// Committed offset.
    pub offset: f64,
    /// Phase after the tick or input.
    pub phase: FlickPhase,
    /// Live animation velocity in units/ms.
    pub velocity: f64,
}

/// Recorded samples, in time order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trace {
    samples: Vec<Sample>,
}

impl Trace {
    /// All samples, oldest first.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recent sample.
    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Distinct phases in the order they were entered.
    pub fn phases(&self) -> Vec<FlickPhase> {
        let mut phases: Vec<FlickPhase> = self.samples.iter().map(|s| s.phase).collect();
        phases.dedup();
        phases
    }

    /// Smallest and largest offset seen, if any sample was recorded.
    pub fn offset_range(&self) -> Option<(f64, f64)> {
        self.samples.iter().fold(None, |range, s| match range {
            None => Some((s.offset, s.offset)),
            Some((lo, hi)) => Some((lo.min(s.offset), hi.max(s.offset))),
        })
    }

    fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }
}

/// A scroller, its synthetic clock, and the trace recorded so far.
#[derive(Debug)]
pub struct Simulation {
    scroller: KineticScroller<ManualClock>,
    clock: ManualClock,
    step_ms: f64,
    trace: Trace,
}

impl Simulation {
    /// Scroller built from `config`, resting at `start_offset` at t = 0.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `config` fails validation.
    pub fn new(config: ScrollerConfig, start_offset: f64) -> Result<Self, InvalidConfig> {
        let clock = ManualClock::new();
        let step_ms = f64::from(config.tick_interval_ms);
        let mut scroller = KineticScroller::with_clock(config, clock.clone())?;
        scroller.set_offset(start_offset);
        Ok(Self {
            scroller,
            clock,
            step_ms,
            trace: Trace::default(),
        })
    }

    /// The simulated scroller.
    pub fn scroller(&self) -> &KineticScroller<ManualClock> {
        &self.scroller
    }

    /// Mutable access to the simulated scroller, for input the script format lacks.
    pub fn scroller_mut(&mut self) -> &mut KineticScroller<ManualClock> {
        &mut self.scroller
    }

    /// Current synthetic time.
    pub fn now_ms(&self) -> f64 {
        self.clock.now().as_millis()
    }

    /// Samples recorded so far.
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Consume the simulation, keeping its trace.
    pub fn into_trace(self) -> Trace {
        self.trace
    }

    /// Apply one input event. `wait` advances time; everything else is instant.
    pub fn apply(&mut self, event: &ScriptEvent) {
        debug!(t_ms = self.now_ms(), ?event, "Applying script event");
        match *event {
            ScriptEvent::Down => self.scroller.on_pointer_down(),
            ScriptEvent::Up => self.scroller.on_pointer_up(),
            ScriptEvent::Drag { delta } => self.scroller.scroll_by(delta),
            ScriptEvent::Flick { velocity } => self.scroller.handle_flick(velocity),
            ScriptEvent::Stop => self.scroller.stop_immediately(),
            ScriptEvent::Correct => self.scroller.correct_overscroll_now(),
            ScriptEvent::Bounds { min, max } => self.scroller.set_bounds(min, max),
            ScriptEvent::Wait { ms } => {
                self.advance(ms);
                return;
            }
        }
        self.record();
    }

    /// Play every event of `script`, then let motion settle for up to `settle_limit_ms`.
    ///
    /// Returns `true` if the scroller ended quiescent.
    pub fn run_script(&mut self, script: &Script, settle_limit_ms: f64) -> bool {
        for event in script.events() {
            self.apply(event);
        }
        self.run_until_idle(settle_limit_ms)
    }

    /// Let `ms` milliseconds pass, ticking whenever the scroller is due.
    pub fn advance(&mut self, ms: f64) {
        let mut remaining = ms;
        while remaining > 0.0 {
            let dt = remaining.min(self.step_ms);
            remaining -= dt;
            self.step(dt);
        }
    }

    /// Tick until nothing is pending or `limit_ms` of synthetic time has passed.
    ///
    /// Returns `true` if the scroller ended quiescent.
    pub fn run_until_idle(&mut self, limit_ms: f64) -> bool {
        let mut elapsed = 0.0;
        while self.scroller.next_wakeup().is_some() && elapsed < limit_ms {
            self.step(self.step_ms);
            elapsed += self.step_ms;
        }
        let idle = self.scroller.next_wakeup().is_none();
        info!(
            t_ms = self.now_ms(),
            offset = self.scroller.current_offset(),
            idle,
            "Simulation settled"
        );
        idle
    }

    fn step(&mut self, dt: f64) {
        self.clock.advance(dt);
        let now = self.now_ms();
        let due = self
            .scroller
            .next_wakeup()
            .is_some_and(|at| at.as_millis() <= now);
        if due {
            self.scroller.tick();
            self.record();
        }
    }

    fn record(&mut self) {
        self.trace.push(Sample {
            t_ms: self.now_ms(),
            offset: self.scroller.current_offset(),
            phase: self.scroller.phase(),
            velocity: self.scroller.instantaneous_velocity(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded() -> ScrollerConfig {
        ScrollerConfig::default().with_bounds(0.0, 1000.0)
    }

    #[test]
    fn canonical_flick_overscrolls_and_settles_on_min() {
        let mut sim = Simulation::new(bounded(), 500.0).unwrap();
        sim.apply(&ScriptEvent::Flick { velocity: 2225.0 });

        assert!(sim.run_until_idle(5000.0));
        assert_eq!(
            sim.trace().phases(),
            vec![
                FlickPhase::Normal,
                FlickPhase::OverScroll,
                FlickPhase::OverscrollCorrection,
                FlickPhase::Idle
            ]
        );
        assert_eq!(sim.scroller().current_offset(), 0.0);
    }

    #[test]
    fn samples_are_time_ordered() {
        let mut sim = Simulation::new(bounded(), 500.0).unwrap();
        sim.apply(&ScriptEvent::Flick { velocity: -2225.0 });
        sim.run_until_idle(5000.0);

        let samples = sim.trace().samples();
        assert!(samples.len() > 10);
        assert!(samples.windows(2).all(|w| w[0].t_ms <= w[1].t_ms));
    }

    #[test]
    fn wait_advances_clock_without_samples_when_quiescent() {
        let mut sim = Simulation::new(bounded(), 500.0).unwrap();
        sim.apply(&ScriptEvent::Wait { ms: 250.0 });
        assert_eq!(sim.now_ms(), 250.0);
        assert!(sim.trace().is_empty());
    }

    #[test]
    fn held_overscroll_springs_back_after_timeout() {
        let mut sim = Simulation::new(bounded(), 500.0).unwrap();
        let script = Script::new(vec![
            ScriptEvent::Bounds {
                min: 600.0,
                max: 1000.0,
            },
            ScriptEvent::Stop,
            ScriptEvent::Down,
            ScriptEvent::Wait { ms: 190.0 },
        ]);
        for event in script.events() {
            sim.apply(event);
        }
        assert_eq!(sim.scroller().phase(), FlickPhase::Idle);

        sim.apply(&ScriptEvent::Wait { ms: 10.0 });
        assert_eq!(sim.scroller().phase(), FlickPhase::OverscrollCorrection);
    }

    #[test]
    fn run_script_plays_events_then_settles() {
        let mut sim = Simulation::new(bounded(), 100.0).unwrap();
        let script = Script::new(vec![
            ScriptEvent::Down,
            ScriptEvent::Drag { delta: -150.0 },
            ScriptEvent::Drag { delta: -10.0 },
            ScriptEvent::Up,
        ]);

        assert!(sim.run_script(&script, 2000.0));

        let (lowest, _) = sim.trace().offset_range().unwrap();
        assert_eq!(lowest, -55.0);
        assert_eq!(sim.scroller().current_offset(), 0.0);
    }

    #[test]
    fn run_until_idle_respects_limit() {
        let mut sim = Simulation::new(bounded(), 500.0).unwrap();
        sim.apply(&ScriptEvent::Flick { velocity: -2225.0 });
        assert!(!sim.run_until_idle(100.0));
        assert_eq!(sim.now_ms(), 100.0);
    }

    #[test]
    fn trace_serializes_phase_names() {
        let mut sim = Simulation::new(bounded(), 500.0).unwrap();
        sim.apply(&ScriptEvent::Flick { velocity: 2225.0 });
        let json = serde_json::to_string(sim.trace()).unwrap();
        assert!(json.contains("\"phase\":\"Normal\""));
    }
}
