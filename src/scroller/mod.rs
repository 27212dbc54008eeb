//! Kinetic scrolling engine.
//!
//! [`KineticScroller`] is the only stateful type; the submodules hold the pure
//! pieces it is assembled from.

pub mod clock;
pub mod easing;
pub mod kinematics;
mod kinetic;
pub mod phase;
pub mod timers;

pub use clock::{Clock, ManualClock, SystemClock};
pub use kinetic::KineticScroller;
pub use phase::FlickPhase;
