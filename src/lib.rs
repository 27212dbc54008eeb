//! Kinetic scrolling physics.
//!
//! A one-dimensional scroll engine: [`scroller::KineticScroller`] turns drags
//! and flicks into decelerating motion, resists travel past the scroll range,
//! and springs content back into range. The host drives time by calling
//! `tick()`; the engine owns no thread and no event loop.
//!
//! The `kscroll` binary replays gesture scripts through a
//! [`simulation::Simulation`] and prints the resulting offset trace.

pub mod config;
pub mod logging;
pub mod model;
pub mod script;
pub mod scroller;
pub mod simulation;

pub use config::ScrollerConfig;
pub use model::{OffsetChange, ScrollBounds, Timestamp};
pub use scroller::{Clock, FlickPhase, KineticScroller, ManualClock, SystemClock};
